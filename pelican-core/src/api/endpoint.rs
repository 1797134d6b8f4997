use crate::filter::FilterId;
use std::str::FromStr;

#[derive(Debug, PartialEq)]
pub enum RegistryEndpoint {
    Health,
    Filters,
    Filter(FilterId),
    FilterResult(FilterId),
}

impl RegistryEndpoint {
    /// Methods this endpoint answers, for `Allow` headers.
    pub fn allowed_methods(&self) -> &'static str {
        match self {
            RegistryEndpoint::Health => "GET",
            RegistryEndpoint::Filters => "GET, POST",
            RegistryEndpoint::Filter(_) => "DELETE",
            RegistryEndpoint::FilterResult(_) => "GET, PUT",
        }
    }
}

impl FromStr for RegistryEndpoint {
    type Err = &'static str;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let trimmed = path.strip_prefix('/').ok_or("path must be absolute")?;
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

        if trimmed.is_empty() {
            return Ok(RegistryEndpoint::Health);
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        match segments.as_slice() {
            ["filter"] => Ok(RegistryEndpoint::Filters),
            ["filter", id] => Ok(RegistryEndpoint::Filter(FilterId::from(id.trim()))),
            ["filter", id, "result"] => {
                Ok(RegistryEndpoint::FilterResult(FilterId::from(id.trim())))
            }
            _ => Err("invalid registry endpoint"),
        }
    }
}
