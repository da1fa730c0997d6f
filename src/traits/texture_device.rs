use crate::core::{Region, Result, TextureSize};

/// GPU texture allocation and transfer
///
/// Implementations must tolerate calls from the producer thread and the
/// presentation thread; the texture store serialises access per texture.
pub trait TextureDevice: Send + Sync {
    /// Device-resident texture handle
    type Texture: Send + Sync;

    /// Allocate a 2D texture, failing instead of handing back a null resource
    fn create_texture(&self, label: &'static str, size: TextureSize) -> Result<Self::Texture>;

    /// Write `region` of `texture` from rows `bytes_per_row` apart.
    ///
    /// The caller has already checked bounds and buffer length.
    fn write_region(&self, texture: &Self::Texture, region: Region, bytes_per_row: u32, pixels: &[u8]);

    /// Read the whole texture back as tightly packed rows
    fn read_texture(&self, texture: &Self::Texture, size: TextureSize) -> Result<Vec<u8>>;
}
