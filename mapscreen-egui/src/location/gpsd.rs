use std::time::Duration;

use async_trait::async_trait;
use galileo_types::latlon;
use mapscreen::{Location, LocationError};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use super::{LocationMessage, LocationProvider, LocationSink};

const WATCH_COMMAND: &[u8] = b"?WATCH={\"enable\":true,\"json\":true}\n";
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Mode value of a TPV report with a 2D fix.
const MODE_2D: u8 = 2;

#[derive(Debug, Deserialize)]
struct Report {
    class: String,
    #[serde(default)]
    mode: u8,
    lat: Option<f64>,
    lon: Option<f64>,
    /// Estimated horizontal position error in meters.
    eph: Option<f64>,
    epx: Option<f64>,
    epy: Option<f64>,
    /// Course over ground in degrees from true north.
    track: Option<f64>,
}

/// Parses one line of the gpsd JSON stream.
///
/// Returns `Ok(None)` for reports that carry no position: other report classes and TPV reports
/// without a fix.
pub fn parse_report(line: &str) -> Result<Option<Location>, LocationError> {
    let report: Report = serde_json::from_str(line)
        .map_err(|err| LocationError::Protocol(format!("invalid gpsd report: {err}")))?;

    if report.class != "TPV" || report.mode < MODE_2D {
        return Ok(None);
    }

    let (Some(lat), Some(lon)) = (report.lat, report.lon) else {
        return Ok(None);
    };

    let mut location = Location::new(latlon!(lat, lon));

    let accuracy = report.eph.or(match (report.epx, report.epy) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, y) => x.or(y),
    });
    if let Some(accuracy) = accuracy {
        location = location.with_accuracy(accuracy);
    }

    if let Some(track) = report.track {
        location = location.with_heading(track);
    }

    Ok(Some(location))
}

/// Reads locations from a gpsd daemon over its JSON protocol.
///
/// Reconnects after a delay when the connection fails or is closed. A connection failure is only
/// reported once until the daemon is reachable again.
pub struct GpsdLocationProvider {
    host: String,
    port: u16,
    reconnect_delay: Duration,
}

impl GpsdLocationProvider {
    /// Creates a provider for the daemon at `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            reconnect_delay: RECONNECT_DELAY,
        }
    }

    /// Sets the time to wait before reconnecting.
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    async fn connect(&self) -> Result<TcpStream, LocationError> {
        let mut stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|err| {
                LocationError::Connection(format!(
                    "failed to connect to gpsd at {}:{}: {err}",
                    self.host, self.port
                ))
            })?;

        stream
            .write_all(WATCH_COMMAND)
            .await
            .map_err(|err| LocationError::Connection(err.to_string()))?;

        log::info!("Connected to gpsd at {}:{}", self.host, self.port);
        Ok(stream)
    }
}

/// Forwards the reports of one connection. Returns when the stream ends or the sink closes.
async fn forward_reports(
    stream: impl AsyncRead + Unpin,
    sink: &LocationSink,
) -> Result<(), LocationError> {
    let mut lines = BufReader::new(stream).lines();

    loop {
        let line = lines
            .next_line()
            .await
            .map_err(|err| LocationError::Connection(err.to_string()))?;
        let Some(line) = line else {
            return Err(LocationError::Connection(
                "gpsd closed the connection".into(),
            ));
        };

        let message = match parse_report(&line) {
            Ok(Some(location)) => LocationMessage::Update(location),
            Ok(None) => continue,
            Err(err) => {
                log::warn!("{err}");
                LocationMessage::Error(err)
            }
        };

        if !sink.send(message) {
            return Ok(());
        }
    }
}

#[async_trait]
impl LocationProvider for GpsdLocationProvider {
    async fn run(&self, sink: LocationSink) {
        let mut reported = false;

        while !sink.is_closed() {
            let result = match self.connect().await {
                Ok(stream) => {
                    reported = false;
                    forward_reports(stream, &sink).await
                }
                Err(err) => Err(err),
            };

            match result {
                Ok(()) => return,
                Err(err) => {
                    log::warn!("{err}");
                    if !reported && !sink.send(LocationMessage::Error(err)) {
                        return;
                    }
                    reported = true;
                }
            }

            tokio::time::sleep(self.reconnect_delay).await;
        }
    }
}
