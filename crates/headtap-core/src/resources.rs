//! Resource URL resolution for patches and icons.

use headtap_schema::DEFAULT_BRANCH;

use crate::env::EnvironmentContext;
use crate::repo::TapRepo;

/// Turn a tap-relative resource path into a download URL.
///
/// First match wins:
///
/// 1. a CI repository is configured: that repository, on the CI branch when
///    one is set and on `master` otherwise;
/// 2. local resources are enabled: `file://<working dir>/<path>`;
/// 3. the canonical upstream tap on `master`.
pub fn resolve_resource_url(relative_path: &str, env: &EnvironmentContext) -> String {
    let path = relative_path.trim_start_matches('/');

    if let Some(repo) = env.ci_repository() {
        let branch = env.ci_branch().unwrap_or(DEFAULT_BRANCH);
        return repo.raw_url(branch, path);
    }

    if env.use_local_resources {
        let dir = env.working_dir.display().to_string();
        return format!("file://{}/{path}", dir.trim_end_matches('/'));
    }

    TapRepo::upstream().raw_url(DEFAULT_BRANCH, path)
}
