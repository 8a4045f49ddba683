use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const TEMPLATE: &str = include_str!("../templates/cloud-config.yaml");
const PUBLIC_KEY_PLACEHOLDER: &str = "{{PUBLIC_KEY}}";

/// Render the boot-time cloud-config that creates the `devpod` user with
/// `public_key` authorized.
pub fn render(public_key: &str) -> String {
    TEMPLATE.replace(PUBLIC_KEY_PLACEHOLDER, public_key.trim())
}

/// Rendered cloud-config, base64 encoded for the `user_data` metadata key.
pub fn user_data(public_key: &str) -> String {
    STANDARD.encode(render(public_key))
}
