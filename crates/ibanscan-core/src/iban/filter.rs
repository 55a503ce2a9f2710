//! Listener-facing stream of recognizer results.
//!
//! Every processing call reports completion to its own
//! [`ProcessingListener`]. Results then go through a single consumer task
//! that drops a list equal to the one delivered just before it, formats a
//! lone IBAN for display and hands the list to the [`IbansListener`].

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use image::DynamicImage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, trace};

use super::recognizer::{IbanRecognizer, RecognitionOutcome};
use super::validator::format_iban;
use crate::error::Result;
use crate::ocr::{Frame, FrameSource, Rotation, TextRecognitionEngine};

/// Receives deduplicated, display-ready IBAN lists.
pub trait IbansListener: Send + 'static {
    fn on_ibans_received(&mut self, ibans: Vec<String>);
}

impl<F> IbansListener for F
where
    F: FnMut(Vec<String>) + Send + 'static,
{
    fn on_ibans_received(&mut self, ibans: Vec<String>) {
        self(ibans)
    }
}

/// Notified once per processing call, whatever its outcome.
pub trait ProcessingListener: Send + 'static {
    fn on_processing_finished(self);
}

impl<F> ProcessingListener for F
where
    F: FnOnce() + Send + 'static,
{
    fn on_processing_finished(self) {
        self()
    }
}

/// Wraps an [`IbanRecognizer`] and streams its results to a listener.
pub struct RecognizerFilter<E: TextRecognitionEngine> {
    recognizer: IbanRecognizer<E>,
    sender: mpsc::UnboundedSender<Vec<String>>,
    cancel: CancellationToken,
    cancel_on_drop: DropGuard,
    delivery: JoinHandle<()>,
}

impl<E: TextRecognitionEngine + 'static> RecognizerFilter<E> {
    /// Create a filter and start its delivery task.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime.
    pub fn new(recognizer: IbanRecognizer<E>, listener: impl IbansListener) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let delivery = tokio::spawn(deliver(receiver, listener, cancel.clone()));

        Self {
            recognizer,
            sender,
            cancel_on_drop: cancel.clone().drop_guard(),
            cancel,
            delivery,
        }
    }

    pub fn recognizer(&self) -> &IbanRecognizer<E> {
        &self.recognizer
    }

    /// Process a decoded image. Fails immediately if `width` or `height` is zero.
    pub fn process_image(
        &self,
        image: DynamicImage,
        width: u32,
        height: u32,
        rotation: Rotation,
        processing_listener: impl ProcessingListener,
    ) -> Result<BoxFuture<'static, ()>> {
        self.process_frame(
            Frame {
                source: FrameSource::Image(image),
                width,
                height,
                rotation,
            },
            processing_listener,
        )
    }

    /// Process a raw byte buffer. Same contract as [`Self::process_image`].
    pub fn process_byte_array(
        &self,
        bytes: Vec<u8>,
        width: u32,
        height: u32,
        rotation: Rotation,
        processing_listener: impl ProcessingListener,
    ) -> Result<BoxFuture<'static, ()>> {
        self.process_frame(
            Frame {
                source: FrameSource::Bytes(bytes),
                width,
                height,
                rotation,
            },
            processing_listener,
        )
    }

    /// Process a frame. The returned future completes once the result has
    /// been queued for delivery, not when the listener has seen it.
    pub fn process_frame(
        &self,
        frame: Frame,
        processing_listener: impl ProcessingListener,
    ) -> Result<BoxFuture<'static, ()>> {
        let recognition = self.recognizer.process_frame(frame)?;
        let sender = self.sender.clone();

        Ok(async move {
            let outcome = recognition.await;
            processing_listener.on_processing_finished();

            if let RecognitionOutcome::Ibans(ibans) = outcome {
                if sender.send(ibans).is_err() {
                    trace!("IBAN delivery stopped, dropping result");
                }
            }
        }
        .boxed())
    }

    /// Stop delivering results to the listener.
    pub fn cleanup(&self) {
        self.cancel.cancel();
    }

    /// Stop delivery and release the recognizer's engine.
    pub fn close(self) {
        self.cleanup();
        self.recognizer.close();
    }

    /// Deliver every queued result, then release the recognizer's engine.
    ///
    /// Waits for outstanding processing futures to complete or be dropped.
    pub async fn finish(self) {
        let Self {
            recognizer,
            sender,
            cancel_on_drop,
            delivery,
            ..
        } = self;

        drop(sender);
        if let Err(e) = delivery.await {
            debug!("IBAN delivery task ended abnormally: {}", e);
        }
        cancel_on_drop.disarm();
        recognizer.close();
    }
}

async fn deliver(
    mut receiver: mpsc::UnboundedReceiver<Vec<String>>,
    mut listener: impl IbansListener,
    cancel: CancellationToken,
) {
    let mut last: Option<Vec<String>> = None;

    loop {
        let ibans = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            received = receiver.recv() => match received {
                Some(ibans) => ibans,
                None => break,
            },
        };

        // Whole-list comparison: the same IBANs in another order are new.
        if last.as_ref() == Some(&ibans) {
            trace!("Skipping repeated IBAN list");
            continue;
        }
        last = Some(ibans.clone());

        listener.on_ibans_received(display_form(ibans));
    }

    debug!("IBAN delivery task finished");
}

/// A lone IBAN is grouped in fours; longer or empty lists are left as they are.
fn display_form(ibans: Vec<String>) -> Vec<String> {
    match ibans.as_slice() {
        [single] => vec![format_iban(single)],
        _ => ibans,
    }
}
