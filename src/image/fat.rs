//! A FAT12/16 volume writer that replaces whole files in place. Only the
//! operations the import step needs are implemented: resolve an absolute
//! 8.3 path, free the old cluster chain, allocate a new one, and update the
//! directory entry. The volume may sit behind an HDI header, whose data
//! offset is read from the header-size field at 0x08.
use super::{ImageError, ImageWriter};
use std::path::{Path, PathBuf};

const DIR_ENTRY_SIZE: usize = 32;
const ATTR_VOLUME_ID: u8 = 0x08;
const ATTR_DIRECTORY: u8 = 0x10;
const ATTR_LONG_NAME: u8 = 0x0F;
const DELETED_MARK: u8 = 0xE5;
const FAT12_EOC: usize = 0xFF8;
const FAT16_EOC: usize = 0xFFF8;
const MAX_FAT12_CLUSTERS: usize = 4085;

fn u16_at(data: &[u8], offset: usize) -> usize {
    u16::from_le_bytes([data[offset], data[offset + 1]]) as usize
}

fn u32_at(data: &[u8], offset: usize) -> usize {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ]) as usize
}

#[derive(Debug)]
struct Geometry {
    cluster_size: usize,
    num_fats: usize,
    /// One FAT copy, in bytes.
    fat_bytes: usize,
    /// Byte offsets from the volume base.
    fat_offset: usize,
    root_offset: usize,
    data_offset: usize,
    root_entries: usize,
    cluster_count: usize,
    fat16: bool,
}

impl Geometry {
    fn parse(vol: &[u8]) -> Result<Self, ImageError> {
        let corrupt = |what: &str| ImageError::ImageCorrupt(what.to_string());
        if vol.len() < 512 {
            return Err(corrupt("volume smaller than a boot sector"));
        }
        let bytes_per_sector = u16_at(vol, 11);
        let sectors_per_cluster = vol[13] as usize;
        let reserved_sectors = u16_at(vol, 14);
        let num_fats = vol[16] as usize;
        let root_entries = u16_at(vol, 17);
        let total_sectors = match u16_at(vol, 19) {
            0 => u32_at(vol, 32),
            n => n,
        };
        let fat_sectors = u16_at(vol, 22);
        if !bytes_per_sector.is_power_of_two() || !(128..=4096).contains(&bytes_per_sector) {
            return Err(corrupt("invalid sector size"));
        }
        if sectors_per_cluster == 0
            || !sectors_per_cluster.is_power_of_two()
            || sectors_per_cluster > 128
        {
            return Err(corrupt("invalid cluster size"));
        }
        if reserved_sectors == 0 || num_fats == 0 || num_fats > 4 {
            return Err(corrupt("invalid reserved area"));
        }
        if root_entries == 0 || fat_sectors == 0 || total_sectors == 0 {
            return Err(corrupt("invalid FAT geometry"));
        }
        let root_sectors =
            (root_entries * DIR_ENTRY_SIZE + bytes_per_sector - 1) / bytes_per_sector;
        let data_start = reserved_sectors + num_fats * fat_sectors + root_sectors;
        if data_start >= total_sectors {
            return Err(corrupt("data region starts past the volume end"));
        }
        if total_sectors * bytes_per_sector > vol.len() {
            return Err(corrupt("volume extends past the end of the image"));
        }
        let cluster_count = (total_sectors - data_start) / sectors_per_cluster;
        if cluster_count == 0 {
            return Err(corrupt("no data clusters"));
        }
        let fat16 = cluster_count >= MAX_FAT12_CLUSTERS;
        let fat_bytes = fat_sectors * bytes_per_sector;
        let needed = if fat16 {
            (cluster_count + 2) * 2
        } else {
            ((cluster_count + 2) * 3 + 1) / 2
        };
        if fat_bytes < needed {
            return Err(corrupt("FAT too small for the cluster count"));
        }
        Ok(Geometry {
            cluster_size: bytes_per_sector * sectors_per_cluster,
            num_fats,
            fat_bytes,
            fat_offset: reserved_sectors * bytes_per_sector,
            root_offset: (reserved_sectors + num_fats * fat_sectors) * bytes_per_sector,
            data_offset: data_start * bytes_per_sector,
            root_entries,
            cluster_count,
            fat16,
        })
    }
}

#[derive(Clone, Copy, Debug)]
struct DirEntry {
    /// Absolute byte offset of the 32-byte entry in the image.
    offset: usize,
    attr: u8,
    first_cluster: usize,
}

#[derive(Debug)]
/// An open disk image. The whole image is held in memory and written back
/// on [FatImage::close] (or on drop, best effort).
pub struct FatImage {
    data: Vec<u8>,
    path: Option<PathBuf>,
    base: usize,
    geom: Geometry,
    dirty: bool,
}

impl FatImage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ImageError> {
        let data = std::fs::read(&path)?;
        let mut image = Self::from_vec(data)?;
        image.path = Some(path.as_ref().to_path_buf());
        Ok(image)
    }

    pub fn from_vec(data: Vec<u8>) -> Result<Self, ImageError> {
        let base = Self::detect_base(&data)?;
        let geom = Geometry::parse(&data[base..])?;
        Ok(FatImage {
            data,
            path: None,
            base,
            geom,
            dirty: false,
        })
    }

    /// Finds the FAT volume: at offset zero for a raw image, or behind the
    /// header of an HDI image.
    fn detect_base(data: &[u8]) -> Result<usize, ImageError> {
        if Geometry::parse(data).is_ok() {
            return Ok(0);
        }
        if data.len() >= 16 {
            let header = u32_at(data, 8);
            if header > 0 && header < data.len() && Geometry::parse(&data[header..]).is_ok() {
                return Ok(header);
            }
        }
        Err(ImageError::ImageCorrupt("no FAT volume found".to_string()))
    }

    /// Writes the image back and consumes the handle.
    pub fn close(mut self) -> Result<(), ImageError> {
        self.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if self.dirty {
            if let Some(path) = &self.path {
                std::fs::write(path, &self.data)?;
            }
            self.dirty = false;
        }
        Ok(())
    }

    /// Reads a whole file out of the image.
    pub fn read_file(&self, path: &str) -> Result<Vec<u8>, ImageError> {
        let entry = self.resolve(path)?;
        let size = u32_at(&self.data, entry.offset + 28);
        let mut out = Vec::with_capacity(size);
        for cluster in self.chain(entry.first_cluster)? {
            let offset = self.cluster_offset(cluster);
            let take = self.geom.cluster_size.min(size - out.len());
            out.extend_from_slice(&self.data[offset..offset + take]);
            if out.len() == size {
                break;
            }
        }
        if out.len() < size {
            return Err(ImageError::ImageCorrupt(format!(
                "cluster chain of {} shorter than its directory size",
                path
            )));
        }
        Ok(out)
    }

    fn fat_entry(&self, cluster: usize) -> usize {
        let fat = self.base + self.geom.fat_offset;
        if self.geom.fat16 {
            u16_at(&self.data, fat + cluster * 2)
        } else {
            let offset = fat + cluster * 3 / 2;
            let v = u16_at(&self.data, offset);
            if cluster & 1 == 0 { v & 0x0FFF } else { v >> 4 }
        }
    }

    fn set_fat_entry(&mut self, cluster: usize, value: usize) {
        for copy in 0..self.geom.num_fats {
            let fat = self.base + self.geom.fat_offset + copy * self.geom.fat_bytes;
            if self.geom.fat16 {
                let offset = fat + cluster * 2;
                self.data[offset..offset + 2].copy_from_slice(&(value as u16).to_le_bytes());
            } else {
                let offset = fat + cluster * 3 / 2;
                if cluster & 1 == 0 {
                    self.data[offset] = (value & 0xFF) as u8;
                    self.data[offset + 1] =
                        (self.data[offset + 1] & 0xF0) | ((value >> 8) & 0x0F) as u8;
                } else {
                    self.data[offset] = (self.data[offset] & 0x0F) | ((value << 4) & 0xF0) as u8;
                    self.data[offset + 1] = ((value >> 4) & 0xFF) as u8;
                }
            }
        }
    }

    fn end_of_chain(&self, value: usize) -> bool {
        if self.geom.fat16 {
            value >= FAT16_EOC
        } else {
            value >= FAT12_EOC
        }
    }

    fn eoc_mark(&self) -> usize {
        if self.geom.fat16 { 0xFFFF } else { 0xFFF }
    }

    fn cluster_offset(&self, cluster: usize) -> usize {
        self.base + self.geom.data_offset + (cluster - 2) * self.geom.cluster_size
    }

    /// Collects a cluster chain. A first cluster of zero is an empty file.
    fn chain(&self, first: usize) -> Result<Vec<usize>, ImageError> {
        let mut chain = Vec::new();
        if first == 0 {
            return Ok(chain);
        }
        let mut cluster = first;
        loop {
            if cluster < 2 || cluster >= self.geom.cluster_count + 2 {
                return Err(ImageError::ImageCorrupt(format!(
                    "cluster {} out of range",
                    cluster
                )));
            }
            chain.push(cluster);
            if chain.len() > self.geom.cluster_count {
                return Err(ImageError::ImageCorrupt("cluster chain loop".to_string()));
            }
            let next = self.fat_entry(cluster);
            if self.end_of_chain(next) {
                break;
            }
            cluster = next;
        }
        Ok(chain)
    }

    /// Byte offsets of every entry slot in a directory; `None` is the root.
    fn dir_entry_offsets(&self, dir: Option<&DirEntry>) -> Result<Vec<usize>, ImageError> {
        match dir {
            None => {
                let root = self.base + self.geom.root_offset;
                Ok((0..self.geom.root_entries)
                    .map(|i| root + i * DIR_ENTRY_SIZE)
                    .collect())
            }
            Some(dir) => {
                let per_cluster = self.geom.cluster_size / DIR_ENTRY_SIZE;
                let mut offsets = Vec::new();
                for cluster in self.chain(dir.first_cluster)? {
                    let start = self.cluster_offset(cluster);
                    offsets.extend((0..per_cluster).map(|i| start + i * DIR_ENTRY_SIZE));
                }
                Ok(offsets)
            }
        }
    }

    fn lookup(&self, offsets: &[usize], name: &[u8; 11]) -> Option<DirEntry> {
        for &offset in offsets {
            let first = self.data[offset];
            if first == 0x00 {
                break;
            }
            if first == DELETED_MARK {
                continue;
            }
            let attr = self.data[offset + 11];
            if attr & ATTR_LONG_NAME == ATTR_LONG_NAME || attr & ATTR_VOLUME_ID != 0 {
                continue;
            }
            if &self.data[offset..offset + 11] == name {
                return Some(DirEntry {
                    offset,
                    attr,
                    first_cluster: u16_at(&self.data, offset + 26),
                });
            }
        }
        None
    }

    fn name_to_83(component: &str) -> Option<[u8; 11]> {
        let (stem, ext) = match component.rsplit_once('.') {
            Some((stem, ext)) => (stem, ext),
            None => (component, ""),
        };
        if stem.is_empty() || stem.len() > 8 || ext.len() > 3 {
            return None;
        }
        let mut name = [b' '; 11];
        for (i, b) in stem.bytes().enumerate() {
            name[i] = b.to_ascii_uppercase();
        }
        for (i, b) in ext.bytes().enumerate() {
            name[8 + i] = b.to_ascii_uppercase();
        }
        Some(name)
    }

    /// Walks an absolute path down to its file entry.
    fn resolve(&self, path: &str) -> Result<DirEntry, ImageError> {
        let not_found = || ImageError::NotFound(path.to_string());
        let components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
        if components.is_empty() {
            return Err(not_found());
        }
        let mut dir: Option<DirEntry> = None;
        for (i, component) in components.iter().enumerate() {
            let offsets = self.dir_entry_offsets(dir.as_ref())?;
            let name = Self::name_to_83(component).ok_or_else(not_found)?;
            let entry = self.lookup(&offsets, &name).ok_or_else(not_found)?;
            if i + 1 == components.len() {
                if entry.attr & ATTR_DIRECTORY != 0 {
                    return Err(not_found());
                }
                return Ok(entry);
            }
            if entry.attr & ATTR_DIRECTORY == 0 {
                return Err(not_found());
            }
            dir = Some(entry);
        }
        Err(not_found())
    }

    fn free_cluster_count(&self) -> usize {
        (2..self.geom.cluster_count + 2)
            .filter(|&c| self.fat_entry(c) == 0)
            .count()
    }
}

impl ImageWriter for FatImage {
    fn replace_file(&mut self, path: &str, data: &[u8]) -> Result<(), ImageError> {
        let entry = self.resolve(path)?;
        let old_chain = self.chain(entry.first_cluster)?;
        let cluster_size = self.geom.cluster_size;
        let needed = (data.len() + cluster_size - 1) / cluster_size;
        let available = self.free_cluster_count() + old_chain.len();
        if needed > available {
            return Err(ImageError::NoSpace {
                needed,
                free: available,
            });
        }
        for &cluster in &old_chain {
            self.set_fat_entry(cluster, 0);
        }
        let mut clusters = Vec::with_capacity(needed);
        for cluster in 2..self.geom.cluster_count + 2 {
            if clusters.len() == needed {
                break;
            }
            if self.fat_entry(cluster) == 0 {
                clusters.push(cluster);
            }
        }
        for (i, &cluster) in clusters.iter().enumerate() {
            let next = match clusters.get(i + 1) {
                Some(&next) => next,
                None => self.eoc_mark(),
            };
            self.set_fat_entry(cluster, next);
            let offset = self.cluster_offset(cluster);
            let start = i * cluster_size;
            let end = (start + cluster_size).min(data.len());
            self.data[offset..offset + end - start].copy_from_slice(&data[start..end]);
            // Zero the slack so stale bytes never leak into the image.
            for b in &mut self.data[offset + end - start..offset + cluster_size] {
                *b = 0;
            }
        }
        let first = clusters.first().copied().unwrap_or(0) as u16;
        self.data[entry.offset + 26..entry.offset + 28].copy_from_slice(&first.to_le_bytes());
        self.data[entry.offset + 28..entry.offset + 32]
            .copy_from_slice(&(data.len() as u32).to_le_bytes());
        self.dirty = true;
        Ok(())
    }
}

impl Drop for FatImage {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
