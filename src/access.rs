use crate::models::Address;

/// Whether the connected account may operate the claim controls
///
/// Compares addresses ignoring ASCII case. An absent or blank address on
/// either side means the owner is not known, which is never a match.
pub fn is_owner(current: Option<&Address>, owner: Option<&Address>) -> bool {
    match (current, owner) {
        (Some(current), Some(owner)) if !current.is_blank() && !owner.is_blank() => {
            current == owner
        }
        _ => false,
    }
}
