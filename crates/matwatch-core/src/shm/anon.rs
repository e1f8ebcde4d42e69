use memmap2::{MmapMut, MmapOptions};

use crate::error::{Error, Result};

pub(super) struct Mapping {
    map: MmapMut,
}

impl Mapping {
    pub(super) fn create(name: &str, size: usize) -> Result<Self> {
        let map = MmapOptions::new()
            .len(size)
            .map_anon()
            .map_err(|e| Error::AllocationFailure(format!("{}: {}", name, e)))?;
        Ok(Self { map })
    }

    pub(super) fn as_slice(&self) -> &[u8] {
        &self.map
    }

    pub(super) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.map
    }
}
