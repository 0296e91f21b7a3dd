use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Stored identity flag. Presence of this file is what makes the app treat
/// the user as signed in; there is no token validation and no expiry.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionIdentity {
    pub username: String,
    pub role: String,
}

pub fn session_path(base: &Path) -> PathBuf {
    base.join("config").join("session.json")
}

pub fn load_session(base: &Path) -> Option<SessionIdentity> {
    let path = session_path(base);
    let contents = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(session) => Some(session),
        Err(e) => {
            eprintln!("[session] Ignoring unreadable session file: {e}");
            None
        }
    }
}

pub fn save_session(base: &Path, session: &SessionIdentity) -> io::Result<()> {
    let path = session_path(base);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(session)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("JSON encode error: {e}")))?;
    fs::write(&path, json)?;
    Ok(())
}

pub fn clear_session(base: &Path) -> io::Result<()> {
    let path = session_path(base);
    if path.exists() {
        fs::remove_file(&path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_base(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "crimedesk-session-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("temp dir");
        dir
    }

    #[test]
    fn session_round_trip() {
        let base = temp_base("roundtrip");
        assert!(load_session(&base).is_none());

        let session = SessionIdentity {
            username: "inspector".to_string(),
            role: "OFFICER".to_string(),
        };
        save_session(&base, &session).expect("save");

        let loaded = load_session(&base).expect("load");
        assert_eq!(loaded.username, "inspector");
        assert_eq!(loaded.role, "OFFICER");

        clear_session(&base).expect("clear");
        assert!(load_session(&base).is_none());
        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn clear_without_session_is_ok() {
        let base = temp_base("clear");
        assert!(clear_session(&base).is_ok());
        let _ = fs::remove_dir_all(&base);
    }
}
