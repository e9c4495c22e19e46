//! Background typeface download
//!
//! The fetch runs on its own thread and reports back exactly once through a
//! one-shot channel. The event loop polls without blocking.

use futures::channel::oneshot;

use super::{typeface::Typeface, FontError};

/// State of a font load as seen by the poller
#[derive(Debug)]
pub enum FontLoad {
    /// Still fetching, or never going to finish
    Pending,
    Ready(Box<Typeface>),
    Failed(FontError),
    /// The result was already handed out
    Finished,
}

pub struct FontLoader {
    url: String,
    receiver: Option<oneshot::Receiver<Result<Typeface, FontError>>>,
}

impl FontLoader {
    /// Starts downloading and parsing the typeface at `url`
    pub fn start(url: &str) -> Result<Self, FontError> {
        let (sender, receiver) = oneshot::channel();
        let thread_url = url.to_string();

        std::thread::Builder::new()
            .name("font-fetch".into())
            .spawn(move || {
                let result = fetch_typeface(&thread_url);
                // The receiver is gone if the app already shut down
                let _ = sender.send(result);
            })?;

        log::info!("Loading font from {}", url);
        Ok(Self::from_receiver(url, receiver))
    }

    /// Wraps an existing completion channel
    pub fn from_receiver(
        url: &str,
        receiver: oneshot::Receiver<Result<Typeface, FontError>>,
    ) -> Self {
        Self {
            url: url.to_string(),
            receiver: Some(receiver),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Non-blocking check for the completion
    ///
    /// Returns `Ready` or `Failed` exactly once, `Finished` afterwards.
    pub fn poll(&mut self) -> FontLoad {
        let Some(receiver) = &mut self.receiver else {
            return FontLoad::Finished;
        };

        let load = match receiver.try_recv() {
            Ok(None) => return FontLoad::Pending,
            Ok(Some(Ok(typeface))) => FontLoad::Ready(Box::new(typeface)),
            Ok(Some(Err(e))) => FontLoad::Failed(e),
            Err(oneshot::Canceled) => FontLoad::Failed(FontError::Canceled),
        };
        self.receiver = None;
        load
    }

    pub fn is_pending(&self) -> bool {
        self.receiver.is_some()
    }
}

/// Blocking GET + parse
pub fn fetch_typeface(url: &str) -> Result<Typeface, FontError> {
    let body = ureq::get(url).call()?.into_body().read_to_string()?;
    log::debug!("Fetched {} bytes of typeface JSON", body.len());
    Typeface::from_json(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINY_FONT: &str = r#"{
        "glyphs": { "A": { "ha": 500, "o": "m 0 0 l 500 0 l 250 700" } },
        "resolution": 1000,
        "boundingBox": { "yMin": 0, "yMax": 700 }
    }"#;

    #[test]
    fn test_unresolved_load_stays_pending() {
        let (_sender, receiver) = oneshot::channel();
        let mut loader = FontLoader::from_receiver("memory://font", receiver);

        for _ in 0..5 {
            assert!(matches!(loader.poll(), FontLoad::Pending));
        }
        assert!(loader.is_pending());
    }

    #[test]
    fn test_completion_is_delivered_once() {
        let (sender, receiver) = oneshot::channel();
        let mut loader = FontLoader::from_receiver("memory://font", receiver);

        sender
            .send(Typeface::from_json(TINY_FONT))
            .expect("receiver alive");

        match loader.poll() {
            FontLoad::Ready(typeface) => assert_eq!(typeface.glyphs.len(), 1),
            other => panic!("expected Ready, got {:?}", other),
        }
        assert!(matches!(loader.poll(), FontLoad::Finished));
        assert!(!loader.is_pending());
    }

    #[test]
    fn test_parse_failure_is_reported() {
        let (sender, receiver) = oneshot::channel();
        let mut loader = FontLoader::from_receiver("memory://font", receiver);

        sender
            .send(Typeface::from_json("not json"))
            .expect("receiver alive");
        assert!(matches!(loader.poll(), FontLoad::Failed(FontError::Parse(_))));
    }

    #[test]
    fn test_dropped_sender_fails_the_load() {
        let (sender, receiver) = oneshot::channel::<Result<Typeface, FontError>>();
        let mut loader = FontLoader::from_receiver("memory://font", receiver);
        drop(sender);

        assert!(matches!(loader.poll(), FontLoad::Failed(FontError::Canceled)));
    }
}
