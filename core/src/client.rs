//! Request builder for every downstream Weibo endpoint.
//!
//! # Design
//! `WeiboClient` holds only the endpoint bases and carries no mutable state
//! between calls. Each operation has a `build_*` method that produces an
//! `HttpRequest` in one of three shapes:
//!
//! - GET with every parameter in the query string,
//! - POST with a form-urlencoded body,
//! - POST with a multipart body carrying the picture.
//!
//! Builders never perform network I/O. The only I/O is copying an
//! attachment the caller already opened into the multipart body.

use url::Url;

use crate::attachment::Attachment;
use crate::config::Endpoints;
use crate::error::{Result, WeiboError};
use crate::http::{HttpMethod, HttpRequest, FORM_CONTENT_TYPE};
use crate::multipart::MultipartWriter;
use crate::params::Params;
use crate::types::{TimelineQuery, WeiboStatus};

pub const UPDATE_STATUS_PATH: &str = "/2/statuses/update.json";
pub const UPLOAD_STATUS_PATH: &str = "/2/statuses/upload.json";
pub const REPLY_MESSAGE_PATH: &str = "/2/messages/reply.json";
pub const SHOW_USER_PATH: &str = "/2/users/show.json";
pub const EMOTIONS_PATH: &str = "/2/emotions.json";
pub const USER_TIMELINE_PATH: &str = "/2/statuses/user_timeline.json";
pub const HOME_TIMELINE_PATH: &str = "/2/statuses/home_timeline.json";
pub const STATUS_COUNT_PATH: &str = "/2/statuses/count.json";
pub const CREATE_COMMENT_PATH: &str = "/2/comments/create.json";

/// Multipart field that carries the picture bytes.
pub const PICTURE_FIELD: &str = "pic";

/// Synchronous, stateless request builder for the Weibo API.
#[derive(Debug, Clone, Default)]
pub struct WeiboClient {
    endpoints: Endpoints,
}

impl WeiboClient {
    pub fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Build a status update. A picture switches the request to a multipart
    /// upload against the upload host.
    pub fn build_send_status(
        &self,
        status: &WeiboStatus,
        picture: Option<Attachment>,
    ) -> Result<HttpRequest> {
        let params = status_params(status);
        match picture {
            Some(picture) => self.multipart_post(
                &self.endpoints.upload_base,
                UPLOAD_STATUS_PATH,
                &params,
                picture,
            ),
            None => self.form_post(&self.endpoints.api_base, UPDATE_STATUS_PATH, &params),
        }
    }

    pub fn build_send_message(
        &self,
        access_token: &str,
        message_type: &str,
        data: &str,
        receiver_id: i64,
        save_sender_box: i32,
    ) -> Result<HttpRequest> {
        let params = Params::new()
            .text("access_token", access_token)
            .text("type", message_type)
            .text("data", data)
            .int("receiver_id", receiver_id)
            .int("save_sender_box", save_sender_box);
        self.form_post(&self.endpoints.message_base, REPLY_MESSAGE_PATH, &params)
    }

    pub fn build_get_user_info_by_id(&self, access_token: &str, uid: i64) -> Result<HttpRequest> {
        let params = Params::new()
            .text("access_token", access_token)
            .int("uid", uid);
        self.get(&self.endpoints.api_base, SHOW_USER_PATH, &params)
    }

    pub fn build_get_user_info_by_name(
        &self,
        access_token: &str,
        screen_name: &str,
    ) -> Result<HttpRequest> {
        let params = Params::new()
            .text("access_token", access_token)
            .text("screen_name", screen_name);
        self.get(&self.endpoints.api_base, SHOW_USER_PATH, &params)
    }

    pub fn build_get_emotions(
        &self,
        access_token: &str,
        emotion_type: &str,
    ) -> Result<HttpRequest> {
        let params = Params::new()
            .text("access_token", access_token)
            .text("type", emotion_type)
            .text("language", "cnname");
        self.get(&self.endpoints.api_base, EMOTIONS_PATH, &params)
    }

    /// Statuses posted by the token's own user.
    pub fn build_get_statuses(
        &self,
        access_token: &str,
        query: &TimelineQuery,
    ) -> Result<HttpRequest> {
        self.get(
            &self.endpoints.api_base,
            USER_TIMELINE_PATH,
            &timeline_params(access_token, query),
        )
    }

    /// Statuses from the token's user and everyone they follow.
    pub fn build_get_concern_statuses(
        &self,
        access_token: &str,
        query: &TimelineQuery,
    ) -> Result<HttpRequest> {
        self.get(
            &self.endpoints.api_base,
            HOME_TIMELINE_PATH,
            &timeline_params(access_token, query),
        )
    }

    /// `ids` is a comma-separated list. The API accepts at most 100 ids;
    /// longer lists are passed through unchanged.
    pub fn build_get_status_interact_count(
        &self,
        access_token: &str,
        ids: &str,
    ) -> Result<HttpRequest> {
        let params = Params::new()
            .text("access_token", access_token)
            .text("ids", ids);
        self.get(&self.endpoints.api_base, STATUS_COUNT_PATH, &params)
    }

    pub fn build_create_comments(
        &self,
        access_token: &str,
        comment: &str,
        id: i64,
        comment_ori: i32,
    ) -> Result<HttpRequest> {
        let params = Params::new()
            .text("access_token", access_token)
            .free_text("comment", comment)
            .int("id", id)
            .int("comment_ori", comment_ori);
        self.form_post(&self.endpoints.api_base, CREATE_COMMENT_PATH, &params)
    }

    fn get(&self, base: &str, path: &str, params: &Params) -> Result<HttpRequest> {
        let mut url = endpoint(base, path)?;
        if !params.is_empty() {
            // Already encoded; `set_query` leaves `%XX` and `+` untouched.
            url.set_query(Some(&params.encode()));
        }
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        })
    }

    fn form_post(&self, base: &str, path: &str, params: &Params) -> Result<HttpRequest> {
        let url = endpoint(base, path)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: url.into(),
            headers: vec![("content-type".to_string(), FORM_CONTENT_TYPE.to_string())],
            body: Some(params.encode().into_bytes()),
        })
    }

    fn multipart_post(
        &self,
        base: &str,
        path: &str,
        params: &Params,
        picture: Attachment,
    ) -> Result<HttpRequest> {
        let url = endpoint(base, path)?;
        let mut writer = MultipartWriter::new();
        for (name, value) in params.iter() {
            writer
                .write_field(name, &value.multipart_value())
                .map_err(|e| WeiboError::Encoding(format!("multipart field {name}: {e}")))?;
        }
        picture
            .write_into(&mut writer, PICTURE_FIELD)
            .map_err(|e| WeiboError::Transport(format!("read picture: {e}")))?;
        let content_type = writer.content_type();
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: url.into(),
            headers: vec![("content-type".to_string(), content_type)],
            body: Some(writer.finish()),
        })
    }
}

/// Parameters of a status update, in wire order.
pub fn status_params(status: &WeiboStatus) -> Params {
    let mut params = Params::new()
        .text("access_token", status.access_token.as_str())
        .free_text("status", status.status.as_str());
    if status.targets_list() {
        params = params
            .int("visible", i32::from(status.visible))
            .text("list_id", status.list_id.as_str());
    }
    params
        .float("lat", status.latitude)
        .float("long", status.longitude)
        .text("annotations", status.annotations.as_str())
        .text("rip", status.real_ip.as_str())
}

fn timeline_params(access_token: &str, query: &TimelineQuery) -> Params {
    Params::new()
        .text("access_token", access_token)
        .int("since_id", query.since_id)
        .int("max_id", query.max_id)
        .int("count", query.count)
        .int("page", query.page)
}

fn endpoint(base: &str, path: &str) -> Result<Url> {
    Url::parse(&format!("{base}{path}"))
        .map_err(|e| WeiboError::Encoding(format!("invalid endpoint {base}{path}: {e}")))
}
