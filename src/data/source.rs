use std::fs;
use std::path::PathBuf;

use super::LoadError;

/// The static resources the dashboard reads
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    StateData,
    CountyByState,
    CountyScatter,
    StateShapes,
    CountyShapes,
}

impl Resource {
    pub fn file_name(self) -> &'static str {
        match self {
            Resource::StateData => "state_data.json",
            Resource::CountyByState => "county_by_state.json",
            Resource::CountyScatter => "county_scatter.json",
            Resource::StateShapes => "us-states.json",
            Resource::CountyShapes => "counties-fips.json",
        }
    }
}

/// Anything that can hand back the raw bytes of a resource.
///
/// Implementations are called from loader threads.
pub trait Fetch: Send + Sync {
    fn fetch(&self, resource: Resource) -> Result<Vec<u8>, LoadError>;
}

/// Where static resources come from: a local directory or an HTTP base URL
pub enum ResourceSource {
    Dir(PathBuf),
    Http {
        base_url: String,
        client: reqwest::blocking::Client,
    },
}

impl ResourceSource {
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        ResourceSource::Dir(path.into())
    }

    pub fn http(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ResourceSource::Http {
            base_url,
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Human-readable origin for the status bar and logs
    pub fn describe(&self) -> String {
        match self {
            ResourceSource::Dir(path) => path.display().to_string(),
            ResourceSource::Http { base_url, .. } => base_url.clone(),
        }
    }
}

impl Fetch for ResourceSource {
    fn fetch(&self, resource: Resource) -> Result<Vec<u8>, LoadError> {
        match self {
            ResourceSource::Dir(dir) => {
                let path = dir.join(resource.file_name());
                fs::read(&path).map_err(|source| LoadError::Io { path, source })
            }
            ResourceSource::Http { base_url, client } => {
                let url = format!("{base_url}/{}", resource.file_name());
                let http_err = |source| LoadError::Http {
                    resource: resource.file_name(),
                    source,
                };
                let response = client
                    .get(&url)
                    .send()
                    .and_then(|r| r.error_for_status())
                    .map_err(http_err)?;
                let bytes = response.bytes().map_err(http_err)?;
                Ok(bytes.to_vec())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_io_error() {
        let source = ResourceSource::dir("/nonexistent/traffic-dash");
        let err = source.fetch(Resource::StateData).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("state_data.json"));
    }

    #[test]
    fn test_http_base_url_trims_slash() {
        let source = ResourceSource::http("http://localhost:5173/data/");
        assert_eq!(source.describe(), "http://localhost:5173/data");
    }
}
