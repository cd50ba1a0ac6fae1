//! Email masking for log output

/// Mask the local part of an email address.
///
/// Keeps the first three characters when the local part is longer than
/// three, otherwise only the first one. Input without an `@` is fully masked.
pub fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return "*".repeat(email.chars().count());
    };

    let len = local.chars().count();
    let visible = if len > 3 { 3 } else { 1.min(len) };
    let shown: String = local.chars().take(visible).collect();

    format!("{}{}@{}", shown, "*".repeat(len - visible), domain)
}
