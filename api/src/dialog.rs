//! Turn handling: identity gate, intent routing and the failure fallback.
//!
//! Every turn loads the conversation's session, makes sure the user is
//! identified, runs exactly one handler and stores the session again (or
//! drops it when the response ends the conversation). A handler failure that
//! is not recovered locally becomes a spoken apology; no turn ever fails at
//! the HTTP level.

use sales_assistant_core::compose::{self, Composer};
use sales_assistant_core::opportunity::MalformedInputError;
use sales_assistant_core::session::Session;
use sales_assistant_core::skill::{
    Intent, RequestEnvelope, ResponseBody, ResponseEnvelope, TurnRequest,
};
use thiserror::Error;

use crate::config::DialogSettings;
use crate::identity::{IdentityError, IdentityProvider};
use crate::session::SessionStore;
use crate::store::{OpportunityStore, StoreError};

mod find;
mod general;
mod revenue;
mod update;

#[derive(Debug, Error)]
pub enum DialogError {
    #[error("no open opportunity matched '{keywords}'")]
    NoMatch { keywords: String },
    #[error("focused opportunity {id} could not be read back")]
    FocusLost { id: String },
    #[error("turn reached a handler without a resolved user")]
    MissingUser,
    #[error(transparent)]
    MalformedInput(#[from] MalformedInputError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("unknown intent '{0}'")]
    UnknownIntent(String),
    #[error("unsupported request type")]
    UnsupportedRequest,
}

/// Intents this skill declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkillIntent {
    GetOpportunity,
    UpdateOpportunity,
    RevenueReport,
    Help,
    Stop,
    Cancel,
    No,
}

impl SkillIntent {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "GetOpportunity" => Some(SkillIntent::GetOpportunity),
            "UpdateOpportunity" => Some(SkillIntent::UpdateOpportunity),
            "RevenueReport" => Some(SkillIntent::RevenueReport),
            "AMAZON.HelpIntent" => Some(SkillIntent::Help),
            "AMAZON.StopIntent" => Some(SkillIntent::Stop),
            "AMAZON.CancelIntent" => Some(SkillIntent::Cancel),
            "AMAZON.NoIntent" => Some(SkillIntent::No),
            _ => None,
        }
    }
}

/// State a handler works with during one turn.
struct Turn<'a, S> {
    store: &'a S,
    session: &'a mut Session,
    settings: &'a DialogSettings,
    composer: Composer<'a>,
}

pub struct Dialog<S, I> {
    store: S,
    identity: I,
    sessions: SessionStore,
    settings: DialogSettings,
}

impl<S, I> Dialog<S, I>
where
    S: OpportunityStore,
    I: IdentityProvider,
{
    pub fn new(store: S, identity: I, sessions: SessionStore, settings: DialogSettings) -> Self {
        Self {
            store,
            identity,
            sessions,
            settings,
        }
    }

    pub async fn handle(&self, envelope: RequestEnvelope) -> ResponseEnvelope {
        let session_id = envelope.session_id().map(str::to_string);

        if let TurnRequest::SessionEndedRequest(ended) = &envelope.request {
            tracing::info!(session_id = ?session_id, reason = ?ended.reason, "session ended");
            if let Some(id) = &session_id {
                self.sessions.remove(id).await;
            }
            return ResponseBody::default().into_envelope();
        }

        let mut session = match &session_id {
            Some(id) => self.sessions.load(id).await,
            None => Session::default(),
        };

        let body = match self.ensure_identity(&mut session, envelope.access_token()).await {
            Err(err) => {
                tracing::warn!(error = %err, "identity not resolved, asking to link account");
                compose::link_account()
            }
            Ok(()) => {
                let composer =
                    Composer::new(&self.settings.card_image_url, envelope.supports_display());
                match self.dispatch(&envelope.request, &mut session, composer).await {
                    Ok(body) => body,
                    Err(err) => {
                        tracing::error!(error = %err, session_id = ?session_id, "turn failed");
                        compose::apology()
                    }
                }
            }
        };

        if let Some(id) = &session_id {
            if body.ends_session() {
                self.sessions.remove(id).await;
            } else {
                self.sessions.save(id, session).await;
            }
        }
        body.into_envelope()
    }

    /// Resolve and cache the user id unless the session already has one.
    async fn ensure_identity(
        &self,
        session: &mut Session,
        access_token: Option<&str>,
    ) -> Result<(), IdentityError> {
        if session.user_id().is_some() {
            return Ok(());
        }
        let token = access_token.ok_or(IdentityError::MissingToken)?;
        let user_id = self.identity.resolve_identity(token).await?;
        tracing::debug!(user_id = %user_id, "identity resolved");
        session.set_user_id(user_id);
        Ok(())
    }

    async fn dispatch(
        &self,
        request: &TurnRequest,
        session: &mut Session,
        composer: Composer<'_>,
    ) -> Result<ResponseBody, DialogError> {
        let intent = match request {
            TurnRequest::LaunchRequest => return Ok(general::launch()),
            TurnRequest::IntentRequest(req) => &req.intent,
            TurnRequest::SessionEndedRequest(_) => return Ok(ResponseBody::default()),
            TurnRequest::Unsupported => return Err(DialogError::UnsupportedRequest),
        };

        let kind = SkillIntent::parse(&intent.name)
            .ok_or_else(|| DialogError::UnknownIntent(intent.name.clone()))?;
        tracing::info!(intent = %intent.name, "handling intent");

        let mut turn = Turn {
            store: &self.store,
            session,
            settings: &self.settings,
            composer,
        };
        route(&mut turn, kind, intent).await
    }
}

async fn route<S: OpportunityStore>(
    turn: &mut Turn<'_, S>,
    kind: SkillIntent,
    intent: &Intent,
) -> Result<ResponseBody, DialogError> {
    match kind {
        SkillIntent::GetOpportunity => find::handle(turn, intent).await,
        SkillIntent::UpdateOpportunity => update::handle(turn, intent).await,
        SkillIntent::RevenueReport => revenue::handle(turn).await,
        SkillIntent::Help => Ok(general::help(turn.session)),
        SkillIntent::Stop => Ok(general::stop()),
        SkillIntent::Cancel => Ok(general::cancel()),
        SkillIntent::No => Ok(general::no()),
    }
}
