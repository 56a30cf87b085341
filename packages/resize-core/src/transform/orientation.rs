use image::metadata::Orientation;

/// バイト列から EXIF Orientation タグを読み取る
///
/// EXIF が無い、または値が不正な場合は `None`。
pub fn read_orientation(data: &[u8]) -> Option<Orientation> {
    let mut cursor = std::io::Cursor::new(data);
    let exif = exif::Reader::new().read_from_container(&mut cursor).ok()?;

    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let value = field.value.get_uint(0)?;

    Orientation::from_exif(u8::try_from(value).ok()?)
}
