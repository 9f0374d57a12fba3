use serde_json::json;
use studyquest_core::LocalIdentity;

use super::{emit, open_state, CmdResult};

pub fn login(name: String, email: Option<String>) -> CmdResult {
    let (mut state, _config) = open_state()?;
    let mut provider = LocalIdentity { name, email };
    if !state.login(&mut provider) {
        return Err("login failed".into());
    }
    let session = state.auth().clone();
    emit(&mut state, &session)
}

pub fn logout() -> CmdResult {
    let (mut state, _config) = open_state()?;
    let mut provider = LocalIdentity {
        name: String::new(),
        email: None,
    };
    state.logout(&mut provider);
    emit(&mut state, &json!({ "authenticated": false }))
}

pub fn whoami() -> CmdResult {
    let (mut state, _config) = open_state()?;
    let session = state.auth().clone();
    emit(&mut state, &session)
}
