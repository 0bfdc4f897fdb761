//! Binary persistence of fitted learned-forecaster models.

use crate::forecast::error::ForecastError;
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// Writes `model` to `path`, replacing any existing file.
pub fn save<T: Serialize>(model: &T, path: &Path) -> Result<(), ForecastError> {
    let file = File::create(path).map_err(|e| ForecastError::ModelPersistIo(path.to_path_buf(), e))?;
    let mut writer = BufWriter::new(file);
    let written = bincode::serde::encode_into_std_write(model, &mut writer, BINCODE_CONFIG)
        .map_err(|e| ForecastError::ModelEncode(path.to_path_buf(), Box::from(e)))?;
    writer
        .flush()
        .map_err(|e| ForecastError::ModelPersistIo(path.to_path_buf(), e))?;
    info!("Saved model to {:?} ({} bytes)", path, written);
    Ok(())
}

pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T, ForecastError> {
    let file = File::open(path).map_err(|e| ForecastError::ModelPersistIo(path.to_path_buf(), e))?;
    let mut reader = BufReader::new(file);
    let model = bincode::serde::decode_from_std_read(&mut reader, BINCODE_CONFIG)
        .map_err(|e| ForecastError::ModelDecode(path.to_path_buf(), Box::from(e)))?;
    info!("Loaded model from {:?}", path);
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load::<Vec<f64>>(&dir.path().join("absent.bin")).unwrap_err();
        assert!(matches!(err, ForecastError::ModelPersistIo(..)));
    }

    #[test]
    fn test_truncated_file_is_decode_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("model.bin");
        save(&vec![1.0_f64, 2.0, 3.0], &path)?;
        let bytes = std::fs::read(&path)?;
        std::fs::write(&path, &bytes[..bytes.len() - 4])?;

        let err = load::<Vec<f64>>(&path).unwrap_err();
        assert!(matches!(err, ForecastError::ModelDecode(..)));
        Ok(())
    }
}
