//! WebDAV upload of the finished composite. WebDAV is plain HTTP verbs,
//! so a blocking agent is enough: MKCOL the target collection, then PUT
//! the file. No retries; DNS and connection failures map to the network
//! error class (exit code 2).

use std::path::Path;

use anyhow::Context as _;
use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::{
    config::WebdavConfig,
    error::{BoothError, BoothResult},
};

/// Push `local` to `<url>/<dir>/<remote_name>`.
pub fn upload_composite(cfg: &WebdavConfig, local: &Path, remote_name: &str) -> BoothResult<()> {
    let agent = ureq::agent();
    let auth = basic_auth(cfg);
    let dir_url = join_url(&cfg.url, &cfg.dir);
    let file_url = join_url(&dir_url, remote_name);

    let mut mkcol = agent.request("MKCOL", &dir_url);
    if let Some(auth) = &auth {
        mkcol = mkcol.set("Authorization", auth);
    }
    match mkcol.call() {
        Ok(_) => tracing::debug!(url = %dir_url, "created remote collection"),
        // MKCOL on an existing collection answers 405.
        Err(ureq::Error::Status(405, _)) => {}
        Err(err) => return Err(map_http_error("create remote collection", err)),
    }

    let bytes = std::fs::read(local)
        .with_context(|| format!("read composite '{}'", local.display()))?;

    let mut put = agent.put(&file_url).set("Content-Type", "image/png");
    if let Some(auth) = &auth {
        put = put.set("Authorization", auth);
    }
    match put.send_bytes(&bytes) {
        Ok(_) => {
            tracing::info!(url = %file_url, bytes = bytes.len(), "composite uploaded");
            Ok(())
        }
        Err(err) => Err(map_http_error("upload composite", err)),
    }
}

fn map_http_error(what: &str, err: ureq::Error) -> BoothError {
    match err {
        ureq::Error::Status(code, _) => {
            BoothError::network(format!("{what}: server answered {code}"))
        }
        ureq::Error::Transport(t) => match t.kind() {
            ureq::ErrorKind::Dns => {
                BoothError::network(format!("{what}: dns resolution failed ({t})"))
            }
            ureq::ErrorKind::ConnectionFailed | ureq::ErrorKind::Io => {
                BoothError::network(format!("{what}: connection failed ({t})"))
            }
            _ => BoothError::network(format!("{what}: {t}")),
        },
    }
}

fn basic_auth(cfg: &WebdavConfig) -> Option<String> {
    let user = cfg.username.as_deref()?;
    let pass = cfg.password.as_deref().unwrap_or("");
    Some(format!("Basic {}", STANDARD.encode(format!("{user}:{pass}"))))
}

fn join_url(base: &str, segment: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        segment.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(join_url("https://dav.example.net/", "/booth"), "https://dav.example.net/booth");
        assert_eq!(join_url("https://dav.example.net", "booth"), "https://dav.example.net/booth");
    }

    #[test]
    fn basic_auth_only_with_username() {
        let mut cfg = WebdavConfig {
            url: "https://dav.example.net".to_string(),
            username: None,
            password: None,
            dir: "booth".to_string(),
        };
        assert!(basic_auth(&cfg).is_none());

        cfg.username = Some("booth".to_string());
        cfg.password = Some("hunter2".to_string());
        let header = basic_auth(&cfg).unwrap();
        assert_eq!(header, format!("Basic {}", STANDARD.encode("booth:hunter2")));
    }

    #[test]
    fn unresolvable_host_maps_to_a_network_error() {
        let cfg = WebdavConfig {
            url: "http://dav.invalid".to_string(),
            username: None,
            password: None,
            dir: "booth".to_string(),
        };
        let local = std::path::PathBuf::from("target").join("upload_tests_missing.png");
        let err = upload_composite(&cfg, &local, "img.png").unwrap_err();
        assert!(matches!(err, BoothError::Network(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
