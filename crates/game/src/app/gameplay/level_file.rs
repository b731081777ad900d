use std::fs;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};

use scroll_engine::{Color, GridError, Level, LoadedLevel, Renderable, SimConfig, TileGrid};
use serde::Deserialize;
use thiserror::Error;

use super::blocks::{BlockContents, Brick, QuestionBlock};
use super::enemies::Goomba;
use super::hero::Hero;
use super::items::{Coin, Flagpole};
use super::pipe::{WarpPipe, PIPE_COLUMNS};
use super::tiles::{Tile, TileKind};
use super::TILE;

/// Widest level the loader accepts, in cells.
pub(crate) const MAX_LEVEL_COLUMNS: i32 = 4096;

#[derive(Debug, Error)]
pub(crate) enum LevelFileError {
    #[error("failed to read level file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid level json at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{layer}[{index}] has unknown tile kind {kind:?}")]
    UnknownTileKind {
        layer: &'static str,
        index: usize,
        kind: String,
    },
    #[error("{layer}[{index}] does not fit the level grid: {source}")]
    Grid {
        layer: &'static str,
        index: usize,
        #[source]
        source: GridError,
    },
    #[error("{layer}[{index}] spans more cells than can be addressed")]
    SpanOverflow { layer: &'static str, index: usize },
    #[error(
        "{layer}[{index}] reaches column {column}, past the widest level of {max}",
        max = MAX_LEVEL_COLUMNS
    )]
    TooWide {
        layer: &'static str,
        index: usize,
        column: i32,
    },
    #[error("no level named {name:?}")]
    UnknownLevel { name: String },
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LevelFile {
    pub(crate) name: String,
    pub(crate) background: Color,
    #[serde(default)]
    pub(crate) auto_scroll: bool,
    pub(crate) player_spawn: CellSpec,
    #[serde(default)]
    pub(crate) scenery: Vec<TileSpec>,
    #[serde(default)]
    pub(crate) statics: Vec<TileSpec>,
    #[serde(default)]
    pub(crate) blocks: Vec<BlockSpec>,
    #[serde(default)]
    pub(crate) entities: Vec<EntitySpec>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct CellSpec {
    pub(crate) row: usize,
    pub(crate) column: i32,
}

/// A rectangle of identical tiles anchored at its top-left cell.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TileSpec {
    pub(crate) kind: String,
    pub(crate) row: usize,
    pub(crate) column: i32,
    #[serde(default = "one")]
    pub(crate) rows: usize,
    #[serde(default = "one_column")]
    pub(crate) columns: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum BlockSpec {
    Brick {
        row: usize,
        column: i32,
    },
    Question {
        row: usize,
        column: i32,
        #[serde(default)]
        contents: BlockContents,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum EntitySpec {
    Coin {
        row: usize,
        column: i32,
    },
    Goomba {
        row: usize,
        column: i32,
    },
    /// Two columns wide, `height` rows down from `top_row`.
    Pipe {
        column: i32,
        top_row: usize,
        height: usize,
        #[serde(default)]
        warp: Option<String>,
    },
    Flagpole {
        column: i32,
        top_row: usize,
        base_row: usize,
        #[serde(default)]
        next: Option<String>,
    },
}

fn one() -> usize {
    1
}

fn one_column() -> i32 {
    1
}

pub(crate) fn parse_level(raw: &str) -> Result<LevelFile, LevelFileError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        LevelFileError::Parse {
            path,
            source: error.into_inner(),
        }
    })
}

pub(crate) fn load_level_file(path: &Path) -> Result<LevelFile, LevelFileError> {
    let raw = fs::read_to_string(path).map_err(|source| LevelFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_level(&raw)
}

/// Instantiates every tile and entity the file describes, plus a fresh hero.
pub(crate) fn build_level(
    file: &LevelFile,
    config: &SimConfig,
) -> Result<LoadedLevel<Hero>, LevelFileError> {
    let mut level = Level::new(file.background, file.auto_scroll, config);
    place_tiles(&mut level.scenery, "scenery", &file.scenery)?;
    place_tiles(&mut level.statics, "statics", &file.statics)?;

    for (index, block) in file.blocks.iter().enumerate() {
        let (row, column, cell) = match *block {
            BlockSpec::Brick { row, column } => (row, column, Brick::boxed(row, column)),
            BlockSpec::Question {
                row,
                column,
                contents,
            } => (row, column, QuestionBlock::boxed(row, column, contents)),
        };
        cell_span("blocks", index, row, 1, column, 1)?;
        level
            .blocks
            .set(row, column, cell)
            .map_err(|source| grid_error("blocks", index, source))?;
    }

    for (index, entity) in file.entities.iter().enumerate() {
        match entity {
            EntitySpec::Coin { row, column } => {
                level.items.push(Box::new(Coin::new(*row, *column)));
            }
            EntitySpec::Goomba { row, column } => {
                level.enemies.push(Box::new(Goomba::new(*row, *column)));
            }
            EntitySpec::Pipe {
                column,
                top_row,
                height,
                warp,
            } => {
                let (rows, columns) =
                    cell_span("entities", index, *top_row, *height, *column, PIPE_COLUMNS)?;
                for row in rows {
                    for column in columns.clone() {
                        level
                            .statics
                            .set(row, column, Tile::boxed(TileKind::Pipe, row, column))
                            .map_err(|source| grid_error("entities", index, source))?;
                    }
                }
                level.pipes.push(Box::new(WarpPipe::new(
                    *column,
                    *top_row,
                    *height,
                    warp.clone(),
                )));
            }
            EntitySpec::Flagpole {
                column,
                top_row,
                base_row,
                next,
            } => {
                cell_span("entities", index, *base_row, 1, *column, 1)?;
                level
                    .statics
                    .set(
                        *base_row,
                        *column,
                        Tile::boxed(TileKind::HardBlock, *base_row, *column),
                    )
                    .map_err(|source| grid_error("entities", index, source))?;
                level.items.push(Box::new(Flagpole::new(
                    *column,
                    *top_row,
                    *base_row,
                    next.clone(),
                )));
            }
        }
    }

    let spawn = file.player_spawn;
    let player = Hero::new(spawn.column as f32 * TILE, spawn.row as f32 * TILE);
    Ok(LoadedLevel {
        name: file.name.clone(),
        level,
        player,
    })
}

fn place_tiles(
    grid: &mut TileGrid<Box<dyn Renderable>>,
    layer: &'static str,
    specs: &[TileSpec],
) -> Result<(), LevelFileError> {
    for (index, spec) in specs.iter().enumerate() {
        let kind = TileKind::from_name(&spec.kind).ok_or_else(|| LevelFileError::UnknownTileKind {
            layer,
            index,
            kind: spec.kind.clone(),
        })?;
        let (rows, columns) =
            cell_span(layer, index, spec.row, spec.rows, spec.column, spec.columns)?;
        for row in rows {
            for column in columns.clone() {
                grid.set(row, column, Tile::boxed(kind, row, column))
                    .map_err(|source| grid_error(layer, index, source))?;
            }
        }
    }
    Ok(())
}

/// Row and column ranges covered by a placement, checked before any cell is
/// written so a bad file cannot overflow or balloon the grid.
fn cell_span(
    layer: &'static str,
    index: usize,
    row: usize,
    rows: usize,
    column: i32,
    columns: i32,
) -> Result<(Range<usize>, Range<i32>), LevelFileError> {
    let overflow = || LevelFileError::SpanOverflow { layer, index };
    let row_end = row.checked_add(rows).ok_or_else(overflow)?;
    let column_end = column.checked_add(columns).ok_or_else(overflow)?;
    if column_end > MAX_LEVEL_COLUMNS {
        return Err(LevelFileError::TooWide {
            layer,
            index,
            column: column_end - 1,
        });
    }
    Ok((row..row_end, column..column_end))
}

fn grid_error(layer: &'static str, index: usize, source: GridError) -> LevelFileError {
    LevelFileError::Grid {
        layer,
        index,
        source,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use scroll_engine::Player;

    use super::*;

    const SMALL_LEVEL: &str = r##"{
        "name": "test",
        "background": "#5c94fc",
        "auto_scroll": true,
        "player_spawn": { "row": 12, "column": 2 },
        "scenery": [{ "kind": "cloud", "row": 2, "column": 4, "columns": 3 }],
        "statics": [{ "kind": "ground", "row": 13, "column": 0, "rows": 2, "columns": 30 }],
        "blocks": [
            { "kind": "brick", "row": 9, "column": 6 },
            { "kind": "question", "row": 9, "column": 7, "contents": "power_up" },
            { "kind": "question", "row": 9, "column": 8 }
        ],
        "entities": [
            { "kind": "coin", "row": 8, "column": 10 },
            { "kind": "goomba", "row": 12, "column": 20 },
            { "kind": "pipe", "column": 14, "top_row": 11, "height": 2, "warp": "1-2" },
            { "kind": "flagpole", "column": 26, "top_row": 3, "base_row": 12, "next": "1-2" }
        ]
    }"##;

    #[test]
    fn parses_and_builds_every_layer() {
        let file = parse_level(SMALL_LEVEL).expect("parse");
        assert_eq!(file.background, Color::rgb(0x5c, 0x94, 0xfc));

        let loaded = build_level(&file, &SimConfig::default()).expect("build");
        let level = &loaded.level;

        assert_eq!(loaded.name, "test");
        assert!(level.auto_scroll);
        assert!(level.scenery.is_occupied(2, 6));
        assert!(level.statics.is_occupied(14, 29));
        assert!(level.is_solid(9, 7));
        assert!(level.is_solid(11, 15));
        assert!(level.is_solid(12, 26));
        assert_eq!(level.items.len(), 2);
        assert_eq!(level.enemies.len(), 1);
        assert_eq!(level.pipes.len(), 1);
        assert_eq!(loaded.player.status().x, 34.0);
    }

    #[test]
    fn parse_errors_carry_the_json_path() {
        let raw = SMALL_LEVEL.replace("{ \"row\": 12, \"column\": 2 }", "{ \"row\": -1, \"column\": 2 }");

        let error = parse_level(&raw).expect_err("negative row");

        match error {
            LevelFileError::Parse { path, .. } => assert_eq!(path, "player_spawn.row"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_color_is_a_parse_error() {
        let raw = SMALL_LEVEL.replace("#5c94fc", "sky blue");

        let error = parse_level(&raw).expect_err("bad color");

        assert!(matches!(error, LevelFileError::Parse { ref path, .. } if path == "background"));
    }

    #[test]
    fn unknown_tile_kinds_are_rejected() {
        let raw = SMALL_LEVEL.replace("\"kind\": \"cloud\"", "\"kind\": \"lava\"");
        let file = parse_level(&raw).expect("parse");

        let error = build_level(&file, &SimConfig::default())
            .err()
            .expect("unknown kind");

        assert!(matches!(
            error,
            LevelFileError::UnknownTileKind { layer: "scenery", index: 0, ref kind } if kind == "lava"
        ));
    }

    #[test]
    fn tiles_below_the_grid_are_rejected() {
        let raw = SMALL_LEVEL.replace("\"rows\": 2", "\"rows\": 3");
        let file = parse_level(&raw).expect("parse");

        let error = build_level(&file, &SimConfig::default())
            .err()
            .expect("out of range");

        assert!(matches!(
            error,
            LevelFileError::Grid {
                layer: "statics",
                index: 0,
                source: GridError::RowOutOfRange { row: 15, rows: 15 },
            }
        ));
    }

    #[test]
    fn oversized_spans_are_errors_not_overflows() {
        let raw = SMALL_LEVEL.replace("\"rows\": 2,", "\"rows\": 18446744073709551615,");
        let file = parse_level(&raw).expect("parse");
        let error = build_level(&file, &SimConfig::default())
            .err()
            .expect("row overflow");
        assert!(matches!(
            error,
            LevelFileError::SpanOverflow { layer: "statics", index: 0 }
        ));

        let raw = SMALL_LEVEL.replace(
            "\"row\": 2, \"column\": 4, \"columns\": 3",
            "\"row\": 2, \"column\": 2147483647, \"columns\": 2",
        );
        let file = parse_level(&raw).expect("parse");
        let error = build_level(&file, &SimConfig::default())
            .err()
            .expect("column overflow");
        assert!(matches!(
            error,
            LevelFileError::SpanOverflow { layer: "scenery", index: 0 }
        ));

        let raw = SMALL_LEVEL.replace("\"top_row\": 11, \"height\": 2", "\"top_row\": 11, \"height\": 18446744073709551615");
        let file = parse_level(&raw).expect("parse");
        let error = build_level(&file, &SimConfig::default())
            .err()
            .expect("pipe overflow");
        assert!(matches!(
            error,
            LevelFileError::SpanOverflow { layer: "entities", index: 2 }
        ));
    }

    #[test]
    fn far_away_cells_are_rejected_before_the_grid_grows() {
        let raw = SMALL_LEVEL.replace(
            "{ \"kind\": \"brick\", \"row\": 9, \"column\": 6 }",
            "{ \"kind\": \"brick\", \"row\": 9, \"column\": 100000000 }",
        );
        let file = parse_level(&raw).expect("parse");

        let error = build_level(&file, &SimConfig::default())
            .err()
            .expect("too wide");

        assert!(matches!(
            error,
            LevelFileError::TooWide { layer: "blocks", index: 0, column: 100000000 }
        ));

        let raw = SMALL_LEVEL.replace("\"columns\": 30", "\"columns\": 5000");
        let file = parse_level(&raw).expect("parse");
        let error = build_level(&file, &SimConfig::default())
            .err()
            .expect("too wide");
        assert!(matches!(
            error,
            LevelFileError::TooWide { layer: "statics", index: 0, column: 4999 }
        ));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(SMALL_LEVEL.as_bytes()).expect("write");

        let level = load_level_file(file.path()).expect("load");

        assert_eq!(level.name, "test");
        assert_eq!(level.entities.len(), 4);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");

        let error = load_level_file(&dir.path().join("absent.json")).expect_err("missing");

        assert!(matches!(error, LevelFileError::Read { .. }));
    }
}
