//! Azure Active Directory commands backed by Microsoft Graph.

mod user_get;
mod user_set;

pub use user_get::UserGet;
pub use user_set::UserSet;

use crate::args::ParsedArgs;
use crate::options::{OptionDescriptor, OptionSet};
use crate::request::encode_path_segment;
use crate::session::Session;

pub(crate) const OBJECT_ID: &str = "objectId";
pub(crate) const USER_PRINCIPAL_NAME: &str = "userPrincipalName";

pub(crate) fn user_options() -> [OptionDescriptor; 2] {
    [
        OptionDescriptor::string(OBJECT_ID)
            .short('i')
            .help("ID of the user"),
        OptionDescriptor::string(USER_PRINCIPAL_NAME)
            .short('n')
            .help("User principal name of the user"),
    ]
}

pub(crate) fn user_option_set() -> OptionSet {
    OptionSet::new(&[OBJECT_ID, USER_PRINCIPAL_NAME])
}

/// `<graph>/v1.0/users/<id>` for whichever identifier was given.
pub(crate) fn user_url(session: &Session, args: &ParsedArgs) -> String {
    let id = args
        .get_str(OBJECT_ID)
        .or_else(|| args.get_str(USER_PRINCIPAL_NAME))
        .unwrap_or_default();
    format!(
        "{}/v1.0/users/{}",
        session.graph_url(),
        encode_path_segment(id)
    )
}
