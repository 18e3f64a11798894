const DEFAULT_TAG: &str = "latest";

/// Repository and tag derived from an image name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef<'a> {
    pub repository: &'a str,
    pub tag: &'a str,
}

impl<'a> RepositoryRef<'a> {
    /// Split on the first `:`. A missing or empty tag means `latest`.
    pub fn parse(image: &'a str) -> Self {
        let (repository, tag) = match image.split_once(':') {
            Some((repository, tag)) if !tag.is_empty() => (repository, tag),
            Some((repository, _)) => (repository, DEFAULT_TAG),
            None => (image, DEFAULT_TAG),
        };
        Self { repository, tag }
    }

    /// Official images live under `library/` and have no namespace segment.
    pub fn is_official(&self) -> bool {
        !self.repository.contains('/')
    }

    /// Path of the tag metadata endpoint, relative to the API base.
    pub fn tag_path(&self) -> String {
        if self.is_official() {
            format!("/v2/repositories/library/{}/tags/{}", self.repository, self.tag)
        } else {
            format!("/v2/repositories/{}/tags/{}", self.repository, self.tag)
        }
    }
}
