use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};
use std::time::Duration;

use flume::Sender;
use reqwest::Client;
use rodio::{Decoder, OutputStream, Sink};
use tracing::warn;

use crate::catalog::MediaDescriptor;
use crate::event::Event;
use crate::playback::backend::{BackendEvent, PlayerBackend};
use crate::playback::output::{OutputError, construct_sink, setup_device_config};
use crate::stream::LiveDataSource;

pub struct StreamedAudioBackend {
    _stream: OutputStream,
    sink: Arc<Sink>,
    client: Client,
    event_tx: Sender<Event>,

    attach_generation: Arc<AtomicU64>,
    attach_task: Option<tokio::task::JoinHandle<()>>,
    ready: Arc<AtomicBool>,
    playing: Arc<AtomicBool>,
    alive: Arc<AtomicBool>,
}

impl StreamedAudioBackend {
    pub fn new(event_tx: Sender<Event>) -> Result<Self, OutputError> {
        let (device, stream_config, sample_format) = setup_device_config()?;
        let (stream, sink) = construct_sink(device, &stream_config, sample_format)?;
        sink.pause();

        let backend = Self {
            _stream: stream,
            sink: Arc::new(sink),
            client: Client::new(),
            event_tx,
            attach_generation: Arc::new(AtomicU64::new(0)),
            attach_task: None,
            ready: Arc::new(AtomicBool::new(false)),
            playing: Arc::new(AtomicBool::new(false)),
            alive: Arc::new(AtomicBool::new(true)),
        };

        backend.start_drain_monitor();
        Ok(backend)
    }

    fn start_drain_monitor(&self) {
        let sink = self.sink.clone();
        let ready = self.ready.clone();
        let playing = self.playing.clone();
        let alive = self.alive.clone();
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            while alive.load(Ordering::Relaxed) {
                tokio::time::sleep(Duration::from_millis(125)).await;

                if playing.load(Ordering::Relaxed)
                    && ready.load(Ordering::Relaxed)
                    && sink.empty()
                {
                    playing.store(false, Ordering::Relaxed);
                    ready.store(false, Ordering::Relaxed);
                    let _ = event_tx.send(Event::Backend(BackendEvent::PlayingChanged(false)));
                }
            }
        });
    }
}

impl PlayerBackend for StreamedAudioBackend {
    fn attach(&mut self, media: &MediaDescriptor) {
        self.sink.stop();
        self.sink.pause();
        self.ready.store(false, Ordering::Relaxed);

        if let Some(task) = self.attach_task.take() {
            task.abort();
        }

        // Stale attaches are discarded by generation; a slow stream open from
        // a previous candidate must never reach the sink.
        let generation = self.attach_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let attach_generation = self.attach_generation.clone();
        let client = self.client.clone();
        let sink = self.sink.clone();
        let ready = self.ready.clone();
        let event_tx = self.event_tx.clone();
        let url = media.id.clone();

        self.attach_task = Some(tokio::spawn(async move {
            let (fault_tx, fault_rx) = flume::unbounded::<String>();

            let source = match LiveDataSource::new(client, &url, fault_tx).await {
                Ok(source) => source,
                Err(e) => {
                    warn!("stream open failed: {e}");
                    if attach_generation.load(Ordering::SeqCst) == generation {
                        let _ = event_tx.send(Event::Backend(BackendEvent::Error(e.to_string())));
                    }
                    return;
                }
            };

            {
                let attach_generation = attach_generation.clone();
                let event_tx = event_tx.clone();
                tokio::spawn(async move {
                    if let Ok(reason) = fault_rx.recv_async().await
                        && attach_generation.load(Ordering::SeqCst) == generation
                    {
                        let _ = event_tx.send(Event::Backend(BackendEvent::Error(reason)));
                    }
                });
            }

            let decoded = tokio::task::spawn_blocking(move || {
                Decoder::builder().with_data(source).with_gapless(true).build()
            })
            .await;

            match decoded {
                Ok(Ok(decoder)) => {
                    if attach_generation.load(Ordering::SeqCst) != generation {
                        return;
                    }
                    sink.append(decoder);
                    ready.store(true, Ordering::Relaxed);
                }
                Ok(Err(e)) => {
                    warn!("stream decode failed: {e}");
                    if attach_generation.load(Ordering::SeqCst) == generation {
                        let _ = event_tx.send(Event::Backend(BackendEvent::Error(e.to_string())));
                    }
                }
                Err(_) => {}
            }
        }));
    }

    fn play(&mut self) {
        self.sink.play();
        self.playing.store(true, Ordering::Relaxed);
        let _ = self
            .event_tx
            .send(Event::Backend(BackendEvent::PlayingChanged(true)));
    }

    fn stop(&mut self) {
        self.sink.pause();
        let _ = self.sink.try_seek(Duration::ZERO);
        self.playing.store(false, Ordering::Relaxed);
        let _ = self
            .event_tx
            .send(Event::Backend(BackendEvent::PlayingChanged(false)));
    }

    fn set_volume(&mut self, volume: u8) {
        self.sink.set_volume(volume.min(100) as f32 / 100.0);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }
}

impl Drop for StreamedAudioBackend {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Relaxed);
        if let Some(task) = self.attach_task.take() {
            task.abort();
        }
        self.sink.stop();
    }
}
