//! Request schema for the Weibo operations.
//!
//! # Design
//! These are the caller-facing records, mirrored from the RPC schema that
//! fronts this adapter. They carry no behavior beyond small accessors; the
//! request builder decides which fields reach the wire.

use serde::{Deserialize, Serialize};

/// Who can see a posted status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    FriendsOnly,
    /// Only members of the group named by `list_id`.
    SpecificList,
}

impl From<Visibility> for i32 {
    fn from(v: Visibility) -> i32 {
        match v {
            Visibility::Public => 0,
            Visibility::Private => 1,
            Visibility::FriendsOnly => 2,
            Visibility::SpecificList => 3,
        }
    }
}

impl TryFrom<i32> for Visibility {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Visibility::Public),
            1 => Ok(Visibility::Private),
            2 => Ok(Visibility::FriendsOnly),
            3 => Ok(Visibility::SpecificList),
            other => Err(format!("unknown visibility code {other}")),
        }
    }
}

/// A status to publish, optionally with a picture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeiboStatus {
    pub status: String,
    pub access_token: String,
    pub visible: Visibility,
    pub list_id: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "long")]
    pub longitude: f64,
    pub annotations: String,
    /// Real IP of the end user on whose behalf the status is posted.
    #[serde(rename = "rip")]
    pub real_ip: String,
    /// Remote URL or local path of a picture; empty for text-only statuses.
    pub pic: String,
}

impl WeiboStatus {
    pub fn has_picture(&self) -> bool {
        !self.pic.is_empty()
    }

    /// `visible` and `list_id` go on the wire only as a pair, and only for
    /// list-restricted statuses that name a list.
    pub fn targets_list(&self) -> bool {
        self.visible == Visibility::SpecificList && !self.list_id.is_empty()
    }
}

/// Paging window shared by the timeline listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineQuery {
    pub since_id: i64,
    pub max_id: i64,
    /// Page size; the API caps it at 100.
    pub count: i32,
    pub page: i32,
}

impl Default for TimelineQuery {
    fn default() -> Self {
        Self {
            since_id: 0,
            max_id: 0,
            count: 20,
            page: 1,
        }
    }
}
