use crate::variant::size::SizeRequest;

/// キーを最後の `/` で `(prefix, filename)` に分割する
pub fn split_key(key: &str) -> Option<(&str, &str)> {
    key.rsplit_once('/')
}

/// リサイズ済み派生画像のストレージキーを導出する
///
/// `prefix/{width}x{height|AUTO}/filename` を返す。区切りが無いキーは
/// 派生キーを作れないのでそのまま返す。
pub fn variant_key(key: &str, size: &SizeRequest) -> String {
    let Some((prefix, filename)) = split_key(key) else {
        return key.to_string();
    };

    match size.segment() {
        Some(segment) => format!("{prefix}/{segment}/{filename}"),
        None => format!("{prefix}/{filename}"),
    }
}

/// 公開ベース URL とキーを連結する（パスセグメントごとにエンコード）
pub fn public_url(base: &str, key: &str) -> String {
    let encoded = key
        .split('/')
        .map(|segment| urlencoding::encode(segment))
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/{}", base.trim_end_matches('/'), encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::size::Width;

    #[test]
    fn test_split_key() {
        assert_eq!(split_key("photos/beach.jpg"), Some(("photos", "beach.jpg")));
        assert_eq!(split_key("a/b/c.png"), Some(("a/b", "c.png")));
        assert_eq!(split_key("beach.jpg"), None);
    }

    #[test]
    fn test_variant_key_width_only() {
        let size = SizeRequest::WidthOnly(Width::Pixels(640));
        assert_eq!(variant_key("photos/beach.jpg", &size), "photos/640xAUTO/beach.jpg");
    }

    #[test]
    fn test_variant_key_width_height() {
        let size = SizeRequest::WidthHeight(Width::Pixels(800), 600);
        assert_eq!(variant_key("2024/01/img.png", &size), "2024/01/800x600/img.png");
    }

    #[test]
    fn test_variant_key_original() {
        assert_eq!(
            variant_key("photos/beach.jpg", &SizeRequest::Original),
            "photos/beach.jpg"
        );
    }

    #[test]
    fn test_variant_key_without_separator() {
        let size = SizeRequest::WidthOnly(Width::Pixels(640));
        assert_eq!(variant_key("beach.jpg", &size), "beach.jpg");
    }

    #[test]
    fn test_variant_key_is_deterministic() {
        let sizes = [
            SizeRequest::Original,
            SizeRequest::WidthOnly(Width::Auto),
            SizeRequest::WidthOnly(Width::Pixels(1280)),
            SizeRequest::WidthHeight(Width::Pixels(320), 240),
        ];
        for key in ["photos/beach.jpg", "beach.jpg", "a/b/c/d.webp", "/leading.jpg"] {
            for size in &sizes {
                assert_eq!(variant_key(key, size), variant_key(key, size));
            }
        }
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            public_url("https://cdn.example.com/", "photos/640xAUTO/beach.jpg"),
            "https://cdn.example.com/photos/640xAUTO/beach.jpg"
        );
        assert_eq!(
            public_url("https://cdn.example.com", "my photos/summer beach.jpg"),
            "https://cdn.example.com/my%20photos/summer%20beach.jpg"
        );
    }
}
