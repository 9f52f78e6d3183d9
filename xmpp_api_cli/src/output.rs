use anyhow::Result;
use xmpp_api_client::Response;

/// Human or JSON rendering of a command result, selected by `--json`.
pub fn render<R: Response>(response: &R, json: bool) -> Result<String> {
    if json {
        Ok(response.to_json()?)
    } else {
        Ok(response.to_string())
    }
}
