use std::{
    fs::{File, OpenOptions},
    io::{BufReader, Write},
    path::Path,
};

use serde_json::{de::IoRead, StreamDeserializer};

use crate::{LedgerEntry, LedgerError};

pub(crate) struct ActiveBlockFile {
    file: File,
    size: u64,
    limit: u64,
}

impl ActiveBlockFile {
    pub(crate) fn open(path: impl AsRef<Path>, limit: u64) -> Result<Self, LedgerError> {
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        let md = file.metadata()?;
        Ok(Self {
            file,
            size: md.len(),
            limit,
        })
    }

    pub(crate) fn append(&mut self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        let mut data = serde_json::to_vec(entry)?;
        data.push(b'\n');
        let data_len = data.len() as u64;
        if self.size > 0 && self.size + data_len > self.limit {
            return Err(LedgerError::BlockFileIsFull);
        }
        self.file.write_all(&data)?;
        self.size += data_len;
        Ok(())
    }

    pub(crate) fn flush(&mut self) -> Result<(), LedgerError> {
        self.file.flush()?;
        Ok(self.file.sync_data()?)
    }
}

/// Cuts an entry torn by an interrupted append off the end of a block and
/// returns the number of bytes removed. Anything other than a truncated final
/// entry is reported as an error.
pub(crate) fn repair_tail(path: impl AsRef<Path>) -> Result<u64, LedgerError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let len = file.metadata()?.len();
    let mut stream =
        StreamDeserializer::<_, LedgerEntry>::new(IoRead::new(BufReader::new(file)));

    let mut valid = 0;
    loop {
        match stream.next() {
            Some(Ok(_)) => valid = stream.byte_offset() as u64,
            Some(Err(err)) if err.is_eof() => break,
            Some(Err(err)) => return Err(err.into()),
            None => return Ok(0),
        }
    }

    let mut file = OpenOptions::new().append(true).open(path)?;
    file.set_len(valid)?;
    if valid > 0 {
        file.write_all(b"\n")?;
    }
    file.sync_data()?;
    Ok(len.saturating_sub(valid))
}

pub(crate) struct InactiveBlockFile {
    deserializer: StreamDeserializer<'static, IoRead<BufReader<File>>, LedgerEntry>,
}

impl InactiveBlockFile {
    pub(crate) fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let file = File::open(path)?;
        Ok(Self {
            deserializer: StreamDeserializer::new(IoRead::new(BufReader::new(file))),
        })
    }
}

impl Iterator for InactiveBlockFile {
    type Item = Result<LedgerEntry, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.deserializer.next().map(|res| res.map_err(Into::into))
    }
}
