const GID_PREFIX: &str = "gid://shopify/";

/// Accepts a raw numeric blog id or an already-qualified global id.
pub fn blog_gid(id: &str) -> String {
    qualify("Blog", id)
}

pub fn qualify(resource: &str, id: &str) -> String {
    let id = id.trim();
    if id.starts_with(GID_PREFIX) {
        id.to_string()
    } else {
        format!("{GID_PREFIX}{resource}/{id}")
    }
}
