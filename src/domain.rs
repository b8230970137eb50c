use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};

/// Camera maker for raw formats, used only to build the type label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawMaker {
    Canon,
    Nikon,
    Sony,
    Fujifilm,
    Olympus,
    Panasonic,
    Pentax,
    Adobe,
    Hasselblad,
    Epson,
    Kodak,
    Minolta,
    Sigma,
    Generic,
}

impl fmt::Display for RawMaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RawMaker::Canon => "Canon",
            RawMaker::Nikon => "Nikon",
            RawMaker::Sony => "Sony",
            RawMaker::Fujifilm => "Fujifilm",
            RawMaker::Olympus => "Olympus",
            RawMaker::Panasonic => "Panasonic",
            RawMaker::Pentax => "Pentax",
            RawMaker::Adobe => "Digital negative",
            RawMaker::Hasselblad => "Hasselblad",
            RawMaker::Epson => "Epson",
            RawMaker::Kodak => "Kodak",
            RawMaker::Minolta => "Minolta",
            RawMaker::Sigma => "Sigma",
            RawMaker::Generic => "Camera",
        };
        f.write_str(name)
    }
}

/// Image formats recognized by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    WebP,
    Tiff,
    Ico,
    Tga,
    Pnm,
    Hdr,
    OpenExr,
    Qoi,
    Avif,
    Heif,
    Svg,
    Fits,
    Xisf,
    Raw(RawMaker),
}

impl ImageFormat {
    /// Classifies an extension (without the dot). Returns `None` for anything
    /// that is not an image.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        let format = match ext.as_str() {
            "png" => ImageFormat::Png,
            "jpg" | "jpeg" | "jpe" | "jfif" => ImageFormat::Jpeg,
            "gif" => ImageFormat::Gif,
            "bmp" | "dib" => ImageFormat::Bmp,
            "webp" => ImageFormat::WebP,
            "tif" | "tiff" => ImageFormat::Tiff,
            "ico" => ImageFormat::Ico,
            "tga" => ImageFormat::Tga,
            "pnm" | "pbm" | "pgm" | "ppm" | "pam" => ImageFormat::Pnm,
            "hdr" => ImageFormat::Hdr,
            "exr" => ImageFormat::OpenExr,
            "qoi" => ImageFormat::Qoi,
            "avif" => ImageFormat::Avif,
            "heic" | "heif" => ImageFormat::Heif,
            "svg" => ImageFormat::Svg,

            // Astronomical formats
            "fits" | "fit" | "fts" => ImageFormat::Fits,
            "xisf" => ImageFormat::Xisf,

            // Camera raw
            "cr2" | "cr3" | "crw" => ImageFormat::Raw(RawMaker::Canon),
            "nef" | "nrw" => ImageFormat::Raw(RawMaker::Nikon),
            "arw" | "srf" | "sr2" => ImageFormat::Raw(RawMaker::Sony),
            "raf" => ImageFormat::Raw(RawMaker::Fujifilm),
            "orf" => ImageFormat::Raw(RawMaker::Olympus),
            "rw2" => ImageFormat::Raw(RawMaker::Panasonic),
            "pef" => ImageFormat::Raw(RawMaker::Pentax),
            "dng" => ImageFormat::Raw(RawMaker::Adobe),
            "3fr" => ImageFormat::Raw(RawMaker::Hasselblad),
            "erf" => ImageFormat::Raw(RawMaker::Epson),
            "kdc" => ImageFormat::Raw(RawMaker::Kodak),
            "mrw" => ImageFormat::Raw(RawMaker::Minolta),
            "x3f" => ImageFormat::Raw(RawMaker::Sigma),
            "raw" => ImageFormat::Raw(RawMaker::Generic),

            _ => return None,
        };
        Some(format)
    }

    /// Classifies a path by its extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Human-readable description of the format
    pub fn label(&self) -> String {
        match self {
            ImageFormat::Png => "PNG image".to_string(),
            ImageFormat::Jpeg => "JPEG image".to_string(),
            ImageFormat::Gif => "GIF image".to_string(),
            ImageFormat::Bmp => "BMP image".to_string(),
            ImageFormat::WebP => "WebP image".to_string(),
            ImageFormat::Tiff => "TIFF image".to_string(),
            ImageFormat::Ico => "Windows icon image".to_string(),
            ImageFormat::Tga => "TGA image".to_string(),
            ImageFormat::Pnm => "Netpbm image".to_string(),
            ImageFormat::Hdr => "Radiance HDR image".to_string(),
            ImageFormat::OpenExr => "OpenEXR image".to_string(),
            ImageFormat::Qoi => "QOI image".to_string(),
            ImageFormat::Avif => "AVIF image".to_string(),
            ImageFormat::Heif => "HEIF image".to_string(),
            ImageFormat::Svg => "SVG image".to_string(),
            ImageFormat::Fits => "FITS image".to_string(),
            ImageFormat::Xisf => "XISF image".to_string(),
            ImageFormat::Raw(maker) => format!("{} raw image", maker),
        }
    }

    /// Whether the built-in decoder can render a preview for this format
    pub fn is_decodable(&self) -> bool {
        matches!(
            self,
            ImageFormat::Png
                | ImageFormat::Jpeg
                | ImageFormat::Gif
                | ImageFormat::Bmp
                | ImageFormat::WebP
                | ImageFormat::Tiff
                | ImageFormat::Ico
                | ImageFormat::Tga
                | ImageFormat::Pnm
                | ImageFormat::Hdr
                | ImageFormat::OpenExr
                | ImageFormat::Qoi
        )
    }
}

/// One listed image file.
///
/// Equality and hashing only look at `path`: two descriptors for the same
/// file are equal even if the size changed between listing passes.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub format: ImageFormat,
    pub type_label: String,
}

impl FileDescriptor {
    /// Builds a descriptor for an existing, readable image file.
    ///
    /// Fails for directories, non-image extensions and unreadable metadata.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let format = ImageFormat::from_path(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Not an image: {}", path.display()),
            )
        })?;

        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Not a regular file: {}", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(FileDescriptor {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
            format,
            type_label: format.label(),
        })
    }
}

impl PartialEq for FileDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for FileDescriptor {}

impl Hash for FileDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

/// Result of inspecting a (possibly unset) directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryStatus {
    /// No directory configured
    NoDirectory,
    /// Path is set but is not an existing directory
    Missing(PathBuf),
    /// Directory exists; images in enumeration order
    Listed {
        path: PathBuf,
        images: Vec<FileDescriptor>,
    },
}

impl DirectoryStatus {
    pub fn images(&self) -> &[FileDescriptor] {
        match self {
            DirectoryStatus::Listed { images, .. } => images,
            _ => &[],
        }
    }

    pub fn into_images(self) -> Vec<FileDescriptor> {
        match self {
            DirectoryStatus::Listed { images, .. } => images,
            _ => Vec::new(),
        }
    }
}

/// Runs one listing pass over `directory`.
///
/// Only immediate children are considered. Subdirectories are skipped, not
/// followed, and entries that are not images or cannot be stat'ed are
/// dropped silently.
pub fn inspect_directory(directory: Option<&Path>) -> DirectoryStatus {
    let Some(dir_path) = directory else {
        return DirectoryStatus::NoDirectory;
    };

    if !dir_path.is_dir() {
        return DirectoryStatus::Missing(dir_path.to_path_buf());
    }

    let entries = match fs::read_dir(dir_path) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("cannot enumerate {}: {}", dir_path.display(), e);
            return DirectoryStatus::Listed {
                path: dir_path.to_path_buf(),
                images: Vec::new(),
            };
        }
    };

    let mut images = Vec::new();

    for entry_result in entries {
        // Entries can disappear between enumeration and stat
        let entry = match entry_result {
            Ok(e) => e,
            Err(_) => continue,
        };

        match FileDescriptor::from_path(&entry.path()) {
            Ok(descriptor) => images.push(descriptor),
            Err(e) => log::trace!("skipping {}: {}", entry.path().display(), e),
        }
    }

    DirectoryStatus::Listed {
        path: dir_path.to_path_buf(),
        images,
    }
}

/// Lists the images directly inside `directory`, in enumeration order.
///
/// Returns an empty list when the directory is unset or does not exist.
pub fn list_images(directory: Option<&Path>) -> Vec<FileDescriptor> {
    inspect_directory(directory).into_images()
}

/// Sorts descriptors by display name, case-insensitively
pub fn sort_by_name(images: &mut [FileDescriptor]) {
    images.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// "No image", "1 image" or "N images"
pub fn describe_image_count(count: usize) -> String {
    match count {
        0 => "No image".to_string(),
        1 => "1 image".to_string(),
        n => format!("{} images", n),
    }
}
