//! Link construction for catalog and method listings

/// Builds console URLs from the site base path and the mount path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Links {
    base_path: String,
    mount: String,
}

impl Links {
    /// `base_path` is normalised to end with `/`, `mount` loses surrounding slashes
    pub fn new(base_path: &str, mount: &str) -> Self {
        let mut base_path = base_path.to_string();
        if !base_path.ends_with('/') {
            base_path.push('/');
        }
        Self {
            base_path,
            mount: mount.trim_matches('/').to_string(),
        }
    }

    /// Console landing page
    pub fn home(&self) -> String {
        format!("{}{}", self.base_path, self.mount)
    }

    /// Page for one service
    pub fn service(&self, alias: &str) -> String {
        format!("{}/{}", self.home(), alias)
    }

    /// Page for one call
    pub fn call(&self, alias: &str, url_token: &str) -> String {
        format!("{}/{}", self.service(alias), url_token)
    }
}

impl Default for Links {
    fn default() -> Self {
        Self::new("/", "browser")
    }
}
