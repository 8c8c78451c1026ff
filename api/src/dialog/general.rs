use sales_assistant_core::session::Session;
use sales_assistant_core::skill::ResponseBody;
use sales_assistant_core::speech::Speech;

pub(super) fn launch() -> ResponseBody {
    ResponseBody::speak(&Speech::text(
        "Welcome to Your Sales Assistant, powered by Salesforce. Try asking about your revenue or ask me about an opportunity.",
    ))
    .keep_open()
}

/// Start over: forgets the user, any search and any focused opportunity.
pub(super) fn help(session: &mut Session) -> ResponseBody {
    session.reset();
    ResponseBody::speak(&Speech::text(
        "The sales assistant skill can get opportunity details, update an opportunity, or get your revenue report. Try asking me to find an opportunity to get started.",
    ))
    .reprompt(&Speech::text("What would you like to do?"))
    .keep_open()
}

pub(super) fn stop() -> ResponseBody {
    ResponseBody::speak(&Speech::text("OK, bye"))
}

pub(super) fn cancel() -> ResponseBody {
    ResponseBody::speak(&Speech::text("OK, bye."))
}

pub(super) fn no() -> ResponseBody {
    ResponseBody::speak(&Speech::text("OK, thanks for using Sales Assistant."))
}
