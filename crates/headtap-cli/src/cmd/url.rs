//! Url command

use headtap_core::{EnvironmentContext, resolve_resource_url};

/// Print where a tap resource would be downloaded from.
pub fn url(path: &str) {
    let env = EnvironmentContext::from_env();
    println!("{}", resolve_resource_url(path, &env));
}
