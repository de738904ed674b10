//! The public operation set.
//!
//! Every operation runs the same pipeline: build the request (opening the
//! picture first for a status upload), dispatch it once, then normalize the
//! response. Nothing is cached or retried, and no state survives a call.

use tracing::{debug, error, info};

use crate::attachment::AttachmentSource;
use crate::client::WeiboClient;
use crate::config::Config;
use crate::dispatch::{Dispatcher, UreqDispatcher};
use crate::error::Result;
use crate::http::HttpRequest;
use crate::normalize::parse_response;
use crate::types::{TimelineQuery, WeiboStatus};

/// Fixed reply to `ping`.
pub const PONG: &str = "pong";

pub struct WeiboSender<D = UreqDispatcher> {
    client: WeiboClient,
    dispatcher: D,
}

impl WeiboSender<UreqDispatcher> {
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            WeiboClient::new(config.endpoints.clone()),
            UreqDispatcher::new(config.timeout),
        )
    }
}

impl Default for WeiboSender<UreqDispatcher> {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl<D: Dispatcher> WeiboSender<D> {
    pub fn new(client: WeiboClient, dispatcher: D) -> Self {
        Self { client, dispatcher }
    }

    pub fn client(&self) -> &WeiboClient {
        &self.client
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn ping(&self) -> &'static str {
        info!("ping");
        PONG
    }

    /// Publish a status. A non-empty `pic` is resolved first and uploaded
    /// as multipart; an unreadable picture fails before anything is sent.
    pub fn send_status(&self, status: &WeiboStatus) -> Result<String> {
        info!(status = %status.status, "sending status");
        let result = self.build_status(status).and_then(|req| self.execute(req));
        finish(result, "send status")
    }

    fn build_status(&self, status: &WeiboStatus) -> Result<HttpRequest> {
        let picture = if status.has_picture() {
            let source = AttachmentSource::from_reference(&status.pic);
            let attachment = source.open(&self.dispatcher).inspect_err(|err| {
                error!(pic = %source, %err, "failed to load picture");
            })?;
            Some(attachment)
        } else {
            None
        };
        self.client.build_send_status(status, picture)
    }

    /// Reply to a private message from `receiver_id`.
    pub fn send_message(
        &self,
        access_token: &str,
        message_type: &str,
        data: &str,
        receiver_id: i64,
        save_sender_box: i32,
    ) -> Result<String> {
        info!(receiver_id, "replying to private message");
        let result = self
            .client
            .build_send_message(access_token, message_type, data, receiver_id, save_sender_box)
            .and_then(|req| self.execute(req));
        finish(result, "reply to private message")
    }

    pub fn get_user_info_by_id(&self, access_token: &str, uid: i64) -> Result<String> {
        info!(uid, "fetching user info");
        let result = self
            .client
            .build_get_user_info_by_id(access_token, uid)
            .and_then(|req| self.execute(req));
        finish(result, "fetch user info by id")
    }

    pub fn get_user_info_by_name(&self, access_token: &str, screen_name: &str) -> Result<String> {
        info!(screen_name, "fetching user info");
        let result = self
            .client
            .build_get_user_info_by_name(access_token, screen_name)
            .and_then(|req| self.execute(req));
        finish(result, "fetch user info by name")
    }

    pub fn get_emotions(&self, access_token: &str, emotion_type: &str) -> Result<String> {
        info!(emotion_type, "fetching emotions");
        let result = self
            .client
            .build_get_emotions(access_token, emotion_type)
            .and_then(|req| self.execute(req));
        finish(result, "fetch emotions")
    }

    pub fn get_statuses(&self, access_token: &str, query: &TimelineQuery) -> Result<String> {
        info!(?query, "fetching user timeline");
        let result = self
            .client
            .build_get_statuses(access_token, query)
            .and_then(|req| self.execute(req));
        finish(result, "fetch user timeline")
    }

    pub fn get_concern_statuses(
        &self,
        access_token: &str,
        query: &TimelineQuery,
    ) -> Result<String> {
        info!(?query, "fetching home timeline");
        let result = self
            .client
            .build_get_concern_statuses(access_token, query)
            .and_then(|req| self.execute(req));
        finish(result, "fetch home timeline")
    }

    pub fn get_status_interact_count(&self, access_token: &str, ids: &str) -> Result<String> {
        info!(ids, "fetching interaction counts");
        let result = self
            .client
            .build_get_status_interact_count(access_token, ids)
            .and_then(|req| self.execute(req));
        finish(result, "fetch interaction counts")
    }

    pub fn create_comments(
        &self,
        access_token: &str,
        comment: &str,
        id: i64,
        comment_ori: i32,
    ) -> Result<String> {
        info!(id, "commenting on status");
        let result = self
            .client
            .build_create_comments(access_token, comment, id, comment_ori)
            .and_then(|req| self.execute(req));
        finish(result, "comment on status")
    }

    fn execute(&self, request: HttpRequest) -> Result<String> {
        debug!(method = request.method.as_str(), url = %redact(&request.url), "dispatching");
        let response = self.dispatcher.send(&request)?;
        debug!(
            status = response.status,
            body = %String::from_utf8_lossy(&response.body),
            "response received"
        );
        parse_response(&response)
    }
}

fn finish(result: Result<String>, operation: &str) -> Result<String> {
    match &result {
        Ok(_) => info!("{operation} succeeded"),
        Err(err) => error!(%err, "{operation} failed"),
    }
    result
}

/// Hide the `access_token` value in a URL before it is logged.
fn redact(url: &str) -> String {
    let Some(start) = url.find("access_token=").map(|i| i + "access_token=".len()) else {
        return url.to_string();
    };
    let end = url[start..].find('&').map_or(url.len(), |i| start + i);
    format!("{}***{}", &url[..start], &url[end..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Endpoints;
    use crate::dispatch::fake::FakeDispatcher;
    use crate::error::WeiboError;
    use crate::http::HttpMethod;
    use crate::types::Visibility;

    fn sender(fake: FakeDispatcher) -> WeiboSender<FakeDispatcher> {
        WeiboSender::new(WeiboClient::new(Endpoints::single("http://weibo.test")), fake)
    }

    #[test]
    fn ping_never_dispatches() {
        let s = sender(FakeDispatcher::default());
        assert_eq!(s.ping(), "pong");
        assert!(s.dispatcher().sent().is_empty());
    }

    #[test]
    fn successful_call_returns_body_verbatim() {
        let s = sender(FakeDispatcher::responding(200, r#"{"id":5}"#));
        assert_eq!(s.get_user_info_by_id("tok", 5).unwrap(), r#"{"id":5}"#);
        let sent = s.dispatcher().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Get);
    }

    #[test]
    fn business_error_surfaces_from_200() {
        let s = sender(FakeDispatcher::responding(
            200,
            r#"{"error_code":20020,"error":"expire"}"#,
        ));
        let err = s.create_comments("tok", "hi", 1, 0).unwrap_err();
        assert_eq!(err.business_code(), Some(20020));
    }

    #[test]
    fn transport_failure_propagates() {
        let s = sender(FakeDispatcher::default());
        let err = s.get_emotions("tok", "face").unwrap_err();
        assert!(matches!(err, WeiboError::Transport(_)));
    }

    #[test]
    fn remote_picture_is_fetched_then_uploaded() {
        let pic = "http://pics.test/cat.png";
        let fake = FakeDispatcher::responding(200, "{}").with_file(pic, b"\x89PNG");
        let s = sender(fake);
        let status = WeiboStatus {
            status: "with pic".to_string(),
            access_token: "tok".to_string(),
            pic: pic.to_string(),
            ..Default::default()
        };
        s.send_status(&status).unwrap();

        assert_eq!(s.dispatcher().fetched(), vec![pic.to_string()]);
        let sent = s.dispatcher().sent();
        assert_eq!(sent[0].url, "http://weibo.test/2/statuses/upload.json");
        assert!(sent[0].body.as_deref().unwrap().windows(4).any(|w| w == b"\x89PNG"));
    }

    #[test]
    fn missing_local_picture_sends_nothing() {
        let s = sender(FakeDispatcher::responding(200, "{}"));
        let status = WeiboStatus {
            status: "broken".to_string(),
            pic: "/no/such/picture.png".to_string(),
            ..Default::default()
        };
        let err = s.send_status(&status).unwrap_err();
        assert!(matches!(err, WeiboError::Transport(_)));
        assert!(s.dispatcher().sent().is_empty());
        assert!(s.dispatcher().fetched().is_empty());
    }

    #[test]
    fn whitespace_picture_reference_is_not_dropped() {
        let s = sender(FakeDispatcher::responding(200, "{}"));
        let status = WeiboStatus {
            status: "blank pic".to_string(),
            access_token: "tok".to_string(),
            pic: "  ".to_string(),
            ..Default::default()
        };
        assert!(status.has_picture());
        let err = s.send_status(&status).unwrap_err();
        assert!(matches!(err, WeiboError::Transport(_)), "got {err:?}");
        assert!(s.dispatcher().sent().is_empty());
    }

    #[test]
    fn text_status_posts_form() {
        let s = sender(FakeDispatcher::responding(200, r#"{"id":1}"#));
        let status = WeiboStatus {
            status: "plain".to_string(),
            access_token: "tok".to_string(),
            visible: Visibility::SpecificList,
            list_id: "9".to_string(),
            ..Default::default()
        };
        s.send_status(&status).unwrap();
        let sent = s.dispatcher().sent();
        assert_eq!(sent[0].url, "http://weibo.test/2/statuses/update.json");
        assert!(sent[0].body_text().unwrap().contains("&visible=3&list_id=9&"));
    }

    #[test]
    fn redact_hides_tokens() {
        assert_eq!(
            redact("http://x/a?access_token=secret&uid=1"),
            "http://x/a?access_token=***&uid=1"
        );
        assert_eq!(
            redact("http://x/a?uid=1&access_token=secret"),
            "http://x/a?uid=1&access_token=***"
        );
        assert_eq!(redact("http://x/a"), "http://x/a");
    }
}
