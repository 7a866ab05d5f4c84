use rodio::{
    Device, DeviceTrait, OutputStream, OutputStreamBuilder, Sink,
    cpal::{BufferSize, SampleFormat, SampleRate, StreamConfig, default_host, traits::HostTrait},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("no audio output device available")]
    NoDevice,

    #[error("audio stream error: {0}")]
    Stream(#[from] rodio::StreamError),
}

pub fn setup_device_config() -> Result<(Device, StreamConfig, SampleFormat), OutputError> {
    let host = default_host();
    let device = host.default_output_device().ok_or(OutputError::NoDevice)?;
    let config: StreamConfig;
    let sample_format: SampleFormat;

    if let Ok(supported) = device.supported_output_configs()
        && let Some(best) = supported.max_by_key(|cfg| cfg.max_sample_rate().0)
    {
        config = StreamConfig {
            channels: best.channels(),
            sample_rate: best.max_sample_rate(),
            buffer_size: BufferSize::Fixed(4096),
        };
        sample_format = best.sample_format();
    } else {
        config = StreamConfig {
            channels: 2,
            sample_rate: SampleRate(48000),
            buffer_size: BufferSize::Fixed(4096),
        };
        sample_format = SampleFormat::F32;
    }

    Ok((device, config, sample_format))
}

pub fn construct_sink(
    device: Device,
    config: &StreamConfig,
    sample_format: SampleFormat,
) -> Result<(OutputStream, Sink), OutputError> {
    let stream = OutputStreamBuilder::default()
        .with_buffer_size(config.buffer_size)
        .with_sample_rate(config.sample_rate.0)
        .with_device(device)
        .with_sample_format(sample_format)
        .open_stream_or_fallback()?;
    let mixer = stream.mixer();
    let sink = Sink::connect_new(mixer);

    Ok((stream, sink))
}
