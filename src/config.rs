//! Static configuration: tunable constants, connection parameters, and the
//! five production load descriptors.
//!
//! The descriptor list is ordered so that tables referenced by foreign keys
//! (`material_master`, `menu`) load before the tables that reference them
//! (`option_master`, `nutrition`, `recipe`).

use std::path::PathBuf;
use std::time::Duration;

use crate::db::{ConnectParams, ConnectParamsBuilder};
use crate::descriptor::{ColumnSpec, LoadDescriptor};

// ============================================================================
// Connection Configuration
// ============================================================================

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(45);

// ============================================================================
// Insert Configuration
// ============================================================================

/// Rows per multi-row INSERT statement.
///
/// PostgreSQL caps bind parameters per statement at u16::MAX; the widest
/// descriptor maps 9 columns, so 500 rows stays well under the limit while
/// keeping statements reasonably sized.
pub const INSERT_BATCH_ROWS: usize = 500;

/// Character encoding of the production CSV exports (Korean Windows, CP949).
static SOURCE_ENCODING: &encoding_rs::Encoding = &encoding_rs::EUC_KR_INIT;

/// Connection parameters for the destination database.
pub fn connect_params() -> anyhow::Result<ConnectParams> {
    let params = ConnectParamsBuilder::default()
        .host("localhost")
        .port(5432u16)
        .database("msaproject")
        .username("root")
        .password("1234")
        .build()?;
    Ok(params)
}

/// The five production load descriptors, in foreign-key-safe order.
pub fn descriptors() -> Vec<LoadDescriptor> {
    vec![
        LoadDescriptor {
            source_path: PathBuf::from("재고.csv"),
            table: "material_master".to_string(),
            encoding: SOURCE_ENCODING,
            columns: vec![
                ColumnSpec::text("재료", "ingredient_name"),
                ColumnSpec::text("단위", "base_unit"),
                ColumnSpec::float("stock_qty (재고량)", "stock_qty"),
            ],
        },
        LoadDescriptor {
            source_path: PathBuf::from("기본 상품 정보.csv"),
            table: "menu".to_string(),
            encoding: SOURCE_ENCODING,
            columns: vec![
                ColumnSpec::text("메뉴 코드", "menu_code"),
                ColumnSpec::text("메뉴명", "menu_name"),
                ColumnSpec::text("카테고리", "category"),
                ColumnSpec::integer("기본 판매가", "base_price"),
                ColumnSpec::text("기본 용량", "base_volume"),
                ColumnSpec::text("알레르기 정보", "allergy_info"),
                ColumnSpec::text("설명", "description"),
                ColumnSpec::text("제작 시간", "create_time"),
            ],
        },
        LoadDescriptor {
            source_path: PathBuf::from("옵션.csv"),
            table: "option_master".to_string(),
            encoding: SOURCE_ENCODING,
            columns: vec![
                // The CSV export really does spell it this way; the loader
                // checks every name against the actual header at load time.
                ColumnSpec::text("optionn_group_name", "option_group_name"),
                ColumnSpec::text("option_name", "option_name"),
                ColumnSpec::integer("default_price", "default_price"),
                ColumnSpec::text("changing_material", "changing_material"),
                ColumnSpec::float("quantity", "quantity"),
                ColumnSpec::text("unit", "unit"),
                ColumnSpec::text("process_method", "process_method"),
            ],
        },
        LoadDescriptor {
            source_path: PathBuf::from("영양 성분 정보.csv"),
            table: "nutrition".to_string(),
            encoding: SOURCE_ENCODING,
            columns: vec![
                ColumnSpec::text("메뉴 코드", "menu_code"),
                ColumnSpec::float("칼로리(kcal)", "calories"),
                ColumnSpec::float("나트륨(mg)", "sodium"),
                ColumnSpec::float("탄수화물(g)", "carbs"),
                ColumnSpec::float("당류(g)", "sugars"),
                ColumnSpec::float("단백질(g)", "protein"),
                ColumnSpec::float("지방(g)", "fat"),
                ColumnSpec::float("포화지방(g)", "saturated_fat"),
                ColumnSpec::float("카페인(mg)", "caffeine"),
            ],
        },
        LoadDescriptor {
            source_path: PathBuf::from("레시피.csv"),
            table: "recipe".to_string(),
            encoding: SOURCE_ENCODING,
            columns: vec![
                ColumnSpec::text("메뉴코드", "menu_code"),
                ColumnSpec::text("재료명", "ingredient_name"),
                ColumnSpec::text("재료구분", "ingredient_category"),
                ColumnSpec::float("소요량", "required_quantity"),
                ColumnSpec::text("단위", "unit"),
            ],
        },
    ]
}
