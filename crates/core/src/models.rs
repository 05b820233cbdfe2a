use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::date;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Post {
    pub id: String,
    pub data: PostData,
    pub path: PathBuf,
}

/// Front matter of a post.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostData {
    pub title: String,
    #[serde(with = "date::serde_flexible")]
    pub publish_date: Date,
    #[serde(default, with = "date::serde_flexible::option")]
    pub updated_date: Option<Date>,
    #[serde(default)]
    pub og_image: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub slug: Option<String>,
}

impl PostData {
    /// The date shown for the post: the update date when present.
    pub fn effective_date(&self) -> Date { self.updated_date.unwrap_or(self.publish_date) }

    /// Whether the post supplies its own preview image. An empty value does not count.
    pub fn has_og_image(&self) -> bool { self.og_image.as_deref().is_some_and(|s| !s.is_empty()) }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub params: RouteParams,
    pub props: RouteProps,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RouteParams {
    pub slug: String,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteProps {
    pub pub_date: Date,
    pub title: String,
}
