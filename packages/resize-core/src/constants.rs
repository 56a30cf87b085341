/// 画像の最大寸法（幅・高さ）
pub const MAX_DIMENSION: u32 = 4096;

/// 画像の最大ピクセル数（1GP = 実質無制限、極端な攻撃のみ防止）
pub const MAX_PIXELS: u64 = 1_000_000_000;

/// デフォルト品質（1-100）
pub const DEFAULT_QUALITY: u8 = 80;

/// 取得する元画像の最大バイト数（50 MiB）
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 50 * 1024 * 1024;

/// オブジェクトキーの最大長（S3 の上限）
pub const MAX_KEY_LEN: usize = 1024;

/// リサイズを許可する幅の一覧
pub const SUPPORTED_WIDTHS: [u32; 12] = [
    320, 640, 800, 1024, 1280, 1360, 1920, 2048, 2056, 2560, 3440, 3840,
];

/// 幅・高さの「指定なし」を表すセンチネル
pub const AUTO: &str = "AUTO";

/// 派生画像は不変なので 1 年キャッシュさせる
pub const CACHE_CONTROL_ONE_YEAR: &str = "public, max-age=31536000";
