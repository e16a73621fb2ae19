//! Framing of records sent from worker processes to the owning process.
//!
//! Each record is one line of JSON. After pushing a record into its queue, the owning process
//! answers with a single acknowledgement byte.

use std::io::{BufRead, ErrorKind, Read, Write};

use crate::{Error, Record, Result};

const ACK: u8 = b'+';

/// Longest accepted frame, newline included.
pub(crate) const MAX_FRAME_BYTES: u64 = 1024 * 1024;

pub(crate) fn write_record(writer: &mut impl Write, record: &Record) -> Result<()> {
    serde_json::to_writer(&mut *writer, record)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Reads the next record, or `None` if the peer closed the connection cleanly.
///
/// `line` is a reusable buffer.
pub(crate) fn read_record(reader: &mut impl BufRead, line: &mut String) -> Result<Option<Record>> {
    line.clear();

    let read = reader.by_ref().take(MAX_FRAME_BYTES).read_line(line)?;

    if read == 0 {
        return Ok(None);
    }

    if !line.ends_with('\n') && u64::try_from(read).is_ok_and(|read| read >= MAX_FRAME_BYTES) {
        return Err(Error::OversizedFrame {
            limit: MAX_FRAME_BYTES,
        });
    }

    Ok(Some(serde_json::from_str(line.trim_end())?))
}

pub(crate) fn write_ack(writer: &mut impl Write) -> Result<()> {
    writer.write_all(&[ACK])?;
    writer.flush()?;
    Ok(())
}

pub(crate) fn read_ack(reader: &mut impl Read) -> Result<()> {
    let mut byte = [0_u8; 1];

    match reader.read_exact(&mut byte) {
        Ok(()) if byte == [ACK] => Ok(()),
        Ok(()) => Err(Error::MissingAcknowledgement),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(Error::MissingAcknowledgement),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io::{self, Cursor};
    use std::time::Duration;

    use super::*;

    #[test]
    fn record_survives_framing() {
        let record = Record::new(
            "multi\nline name".to_string(),
            Duration::from_millis(1500),
            Duration::ZERO,
            12,
            4096,
            3,
            777,
        );

        let mut buffer = Vec::new();
        write_record(&mut buffer, &record).unwrap();

        // Exactly one line per record, even when the name contains a newline.
        assert_eq!(buffer.iter().filter(|b| **b == b'\n').count(), 1);

        let mut reader = Cursor::new(buffer);
        let mut line = String::new();
        let decoded = read_record(&mut reader, &mut line).unwrap();

        assert_eq!(decoded, Some(record));
        assert_eq!(read_record(&mut reader, &mut line).unwrap(), None);
    }

    #[test]
    fn garbage_is_malformed() {
        let mut reader = Cursor::new(b"{not json}\n".to_vec());
        let mut line = String::new();

        let result = read_record(&mut reader, &mut line);

        assert!(matches!(result, Err(Error::MalformedFrame(_))));
    }

    #[test]
    fn ack_round_trip() {
        let mut buffer = Vec::new();
        write_ack(&mut buffer).unwrap();

        read_ack(&mut Cursor::new(buffer)).unwrap();
    }

    #[test]
    fn closed_connection_is_missing_ack() {
        let result = read_ack(&mut Cursor::new(Vec::new()));

        assert!(matches!(result, Err(Error::MissingAcknowledgement)));
    }

    #[test]
    fn invalid_record_values_are_malformed() {
        let frame = br#"{"name":"bad","time":-1.0,"gctime":5.0,"n_allocs":-3,"bytes":-10,"thread_id":1,"pid":2}
"#;
        let mut reader = Cursor::new(frame.to_vec());
        let mut line = String::new();

        let result = read_record(&mut reader, &mut line);

        assert!(matches!(result, Err(Error::MalformedFrame(_))));
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let length = usize::try_from(MAX_FRAME_BYTES).unwrap() + 10;
        let mut reader = Cursor::new(vec![b'a'; length]);
        let mut line = String::new();

        let result = read_record(&mut reader, &mut line);

        assert!(matches!(result, Err(Error::OversizedFrame { .. })));
        assert_eq!(line.len(), usize::try_from(MAX_FRAME_BYTES).unwrap());
    }

    #[test]
    fn unexpected_ack_byte_is_missing_ack() {
        let result = read_ack(&mut Cursor::new(b"?".to_vec()));

        assert!(matches!(result, Err(Error::MissingAcknowledgement)));
    }

    /// Fails the first read with `Interrupted`, then yields its bytes.
    struct InterruptedOnce {
        interrupted: bool,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for InterruptedOnce {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(ErrorKind::Interrupted.into());
            }

            self.inner.read(buf)
        }
    }

    #[test]
    fn interrupted_read_still_waits_for_ack() {
        let mut reader = InterruptedOnce {
            interrupted: false,
            inner: Cursor::new(vec![ACK]),
        };

        read_ack(&mut reader).unwrap();
    }
}
