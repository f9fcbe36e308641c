//! Line-oriented scanner that extracts the Base64 payloads of PEM certificate blocks from a text
//! stream

use std::io::BufRead;

use log::{debug, error, warn};

use crate::util::error::*;

/// Line that opens a certificate block
pub const PEM_CERT_HEADER: &str = "-----BEGIN CERTIFICATE-----";

/// Line that closes a certificate block
pub const PEM_CERT_FOOTER: &str = "-----END CERTIFICATE-----";

/// `PemBlock` is the Base64 text captured between one header/footer pair, with line endings removed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PemBlock {
    /// Concatenation of the lines between the header and footer
    pub payload: String,
    /// `<source>#<index>` where index counts the blocks yielded from the source, starting at 0
    pub locator: String,
}

/// `PemBlocks` lazily yields a [`PemBlock`] for each complete certificate block in a stream, in the
/// order the blocks appear.
///
/// - A header line seen while a block is open discards the partial block and opens a new one.
/// - A footer line with no open block is ignored.
/// - A block that is still open at end of stream is discarded.
/// - An I/O error is yielded once and ends the sequence.
pub struct PemBlocks<R: BufRead> {
    reader: R,
    source: String,
    region: Option<String>,
    region_start: usize,
    line_number: usize,
    blocks_yielded: usize,
    done: bool,
}

impl<R: BufRead> PemBlocks<R> {
    /// Creates a scanner over `reader`. The `source` name is used in locators and log output.
    pub fn new(reader: R, source: &str) -> Self {
        PemBlocks {
            reader,
            source: source.to_string(),
            region: None,
            region_start: 0,
            line_number: 0,
            blocks_yielded: 0,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for PemBlocks<R> {
    type Item = Result<PemBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.reader.read_until(b'\n', &mut buf) {
                Ok(0) => {
                    self.done = true;
                    if self.region.take().is_some() {
                        warn!(
                            "Discarding unterminated certificate block that began on line {} of {}",
                            self.region_start, self.source
                        );
                    }
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    self.done = true;
                    error!("Failed to read from {}: {}", self.source, e);
                    return Some(Err(Error::from(e)));
                }
            }
            self.line_number += 1;

            let text = String::from_utf8_lossy(&buf);
            let line = text.trim_end_matches('\n').trim_end_matches('\r');

            if line == PEM_CERT_FOOTER {
                match self.region.take() {
                    Some(payload) => {
                        let locator = format!("{}#{}", self.source, self.blocks_yielded);
                        self.blocks_yielded += 1;
                        return Some(Ok(PemBlock { payload, locator }));
                    }
                    None => debug!(
                        "Ignoring footer without header on line {} of {}",
                        self.line_number, self.source
                    ),
                }
            } else if line == PEM_CERT_HEADER {
                if self.region.is_some() {
                    warn!(
                        "Discarding certificate block that began on line {} of {}: header seen before footer",
                        self.region_start, self.source
                    );
                }
                self.region = Some(String::new());
                self.region_start = self.line_number;
            } else if let Some(region) = self.region.as_mut() {
                region.push_str(line);
            }
        }
    }
}
