//! Shared fixtures for the integration tests
//!
//! `ScriptedTransport` answers from per-URL reply queues so tests can stage
//! transient failures, redirects and successes without a network. The last
//! reply queued for a URL is repeated once the queue runs down to it.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tululu_harvest::config::Config;
use tululu_harvest::crawler::{RawResponse, Transport, TransportError};
use url::Url;

pub const BASE: &str = "https://tululu.org/";

pub fn url(path: &str) -> Url {
    Url::parse(BASE).unwrap().join(path).unwrap()
}

#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Result<RawResponse, TransportError>>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, path: &str, reply: Result<RawResponse, TransportError>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(url(path).to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn html(self, path: &str, body: &str) -> Self {
        let reply = Ok(RawResponse::text(url(path), body));
        self.reply(path, reply)
    }

    pub fn bytes(self, path: &str, body: &[u8]) -> Self {
        let reply = Ok(RawResponse::binary(url(path), "image/jpeg", body.to_vec()));
        self.reply(path, reply)
    }

    pub fn transient(self, path: &str) -> Self {
        let reply = Err(TransportError::Transient {
            url: url(path).to_string(),
            message: "connection reset by peer".to_string(),
        });
        self.reply(path, reply)
    }

    pub fn redirect(self, path: &str) -> Self {
        let reply = Err(TransportError::NotFound {
            url: url(path).to_string(),
        });
        self.reply(path, reply)
    }

    pub fn status(self, path: &str, status: u16) -> Self {
        let reply = Err(TransportError::Status {
            url: url(path).to_string(),
            status,
        });
        self.reply(path, reply)
    }

    /// Every URL requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, path: &str) -> usize {
        let target = url(path).to_string();
        self.requests().iter().filter(|u| **u == target).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch(&self, url: &Url) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(url.to_string());

        let mut replies = self.replies.lock().unwrap();
        match replies.get_mut(url.as_str()) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Err(TransportError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Catalog page listing the given book ids, two anchors per entry
pub fn catalog_page(book_ids: &[u32]) -> String {
    let cards: String = book_ids
        .iter()
        .map(|id| {
            format!(
                r#"<table class="d_book"><tr>
                    <td><a href="/b{id}/"><img src="/shots/{id}.jpg"></a></td>
                    <td><a href="/b{id}/"><b>Book {id}</b></a></td>
                </tr></table>"#
            )
        })
        .collect();
    format!(r#"<html><body><div id="content">{}</div></body></html>"#, cards)
}

/// Category root with a pagination control whose sixth element is `last`
pub fn category_root(last: u32) -> String {
    let links: String = [1, 2, 3, 4, 5]
        .iter()
        .map(|n| format!(r#"<a class="npage" href="/l55/{n}/">{n}</a>"#))
        .collect();
    format!(
        r#"<html><body><p class="center">{}<a class="npage" href="/l55/{last}/">{last}</a></p></body></html>"#,
        links
    )
}

/// Book page fixture
///
/// `text_link` controls whether the metadata table offers a txt download.
pub fn book_page(id: u32, title: &str, author: &str, text_link: bool) -> String {
    let download = if text_link {
        format!(r#"<a href="/txt.php?id={id}">скачать txt</a>"#)
    } else {
        String::new()
    };
    format!(
        r#"<html><body>
        <h1>{title} &nbsp; :: &nbsp; {author}</h1>
        <div class="bookimage"><a href="/b{id}/"><img src="/shots/{id}.jpg"></a></div>
        <table class="d_book"><tr><td><a href="/read{id}/">читать</a> {download}</td></tr></table>
        <span class="d_book"><b>Жанр книги:</b> <a href="/l55/">Научная фантастика</a></span>
        <div class="texts"><b>Гость</b><br><span class="black">Комментарий к книге {id}</span></div>
        </body></html>"#
    )
}

/// Configuration pointing at the fake site with no retry pause
pub fn test_config(base_url: &str, dest: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.site.category_id = 55;
    config.http.retry_delay_secs = 0;
    config.output.dest_folder = dest.to_path_buf();
    config
}
