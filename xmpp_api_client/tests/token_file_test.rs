use chrono::{TimeDelta, Utc};
use std::fs;
use tempfile::tempdir;
use xmpp_api_client::{ApiError, OAuthToken};

fn sample_token() -> OAuthToken {
    OAuthToken {
        access_token: "AaQTb0PUZqeZhFKYoaTQBb4KKkCTAolE".to_string(),
        endpoint: "http://localhost:5281/".to_string(),
        jid: "admin@localhost".to_string(),
        scope: "ejabberd:admin".to_string(),
        expiration: Utc::now() + TimeDelta::days(365),
    }
}

#[test]
fn saved_token_loads_back() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join(".xmpp-api-oauth.json");
    let token = sample_token();

    token.save(&file).unwrap();
    let loaded = OAuthToken::load(&file).unwrap();

    assert_eq!(loaded, token);
    assert!(!loaded.is_expired());
}

#[test]
fn file_uses_legacy_field_names() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("token.json");
    sample_token().save(&file).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    for key in ["AccessToken", "Endpoint", "JID", "Scope", "Expiration"] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
}

#[cfg(unix)]
#[test]
fn file_is_not_world_readable() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempdir().unwrap();
    let file = tmp.path().join("token.json");
    sample_token().save(&file).unwrap();

    let mode = fs::metadata(&file).unwrap().permissions().mode();
    assert_eq!(mode & 0o007, 0);
}

#[cfg(unix)]
#[test]
fn save_tightens_existing_file_mode() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempdir().unwrap();
    let file = tmp.path().join("token.json");
    fs::write(&file, "{}").unwrap();
    fs::set_permissions(&file, fs::Permissions::from_mode(0o644)).unwrap();

    sample_token().save(&file).unwrap();

    let mode = fs::metadata(&file).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o640);
    assert_eq!(
        OAuthToken::load(&file).unwrap().access_token,
        sample_token().access_token
    );
}

#[test]
fn save_overwrites_previous_token() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("token.json");
    let mut token = sample_token();
    token.save(&file).unwrap();

    token.access_token = "short".to_string();
    token.save(&file).unwrap();

    assert_eq!(OAuthToken::load(&file).unwrap().access_token, "short");
}

#[test]
fn missing_file_is_io_error() {
    let tmp = tempdir().unwrap();
    let err = OAuthToken::load(tmp.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ApiError::Io(_)));
}

#[test]
fn malformed_file_is_json_error() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("bad.json");
    fs::write(&file, "{ invalid json }").unwrap();
    assert!(matches!(OAuthToken::load(&file), Err(ApiError::Json(_))));
}
