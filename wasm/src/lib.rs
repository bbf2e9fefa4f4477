use minesweeper_ai as ms;
use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::prelude::*;

fn load(bts: &[u8]) -> Result<ms::KnowledgeBase, String> {
    bcs::from_bytes(bts).map_err(|e| e.to_string())
}

fn store(player: &ms::KnowledgeBase) -> Result<Vec<u8>, String> {
    bcs::to_bytes(player).map_err(|e| e.to_string())
}

fn encode_move(cell: Option<ms::Point>) -> Vec<u32> {
    cell.map(|p| vec![p.row as u32, p.col as u32]).unwrap_or_default()
}

fn encode_cells<'a>(cells: impl IntoIterator<Item = &'a ms::Point>) -> Vec<u32> {
    cells
        .into_iter()
        .flat_map(|p| [p.row as u32, p.col as u32])
        .collect()
}

#[wasm_bindgen]
pub fn new_player(height: usize, width: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    store(&ms::KnowledgeBase::new(height, width))
}

#[wasm_bindgen]
pub fn add_knowledge(bts: Vec<u8>, row: usize, col: usize, count: u8) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut player = load(&bts)?;
    player
        .add_knowledge(ms::Point { row, col }, count)
        .map_err(|e| e.to_string())?;
    store(&player)
}

/// `[row, col]` of a provably safe move, or empty.
#[wasm_bindgen]
pub fn safe_move(bts: Vec<u8>) -> Result<Vec<u32>, String> {
    console_error_panic_hook::set_once();

    Ok(encode_move(load(&bts)?.safe_move()))
}

/// `[row, col]` of a guess, or empty when every cell is played or a known mine.
#[wasm_bindgen]
pub fn fallback_move(bts: Vec<u8>, seed: u64) -> Result<Vec<u32>, String> {
    console_error_panic_hook::set_once();

    let mut rng = StdRng::seed_from_u64(seed);
    Ok(encode_move(load(&bts)?.fallback_move(&mut rng)))
}

/// Known mines as flattened `[row, col, row, col, ...]`.
#[wasm_bindgen]
pub fn known_mines(bts: Vec<u8>) -> Result<Vec<u32>, String> {
    console_error_panic_hook::set_once();

    Ok(encode_cells(load(&bts)?.mines()))
}

/// Known safe cells as flattened `[row, col, row, col, ...]`.
#[wasm_bindgen]
pub fn known_safes(bts: Vec<u8>) -> Result<Vec<u32>, String> {
    console_error_panic_hook::set_once();

    Ok(encode_cells(load(&bts)?.safes()))
}
