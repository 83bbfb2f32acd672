use minesweeper as ms;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn new_session(height: u8, width: u8, mines: u8) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    if mines as usize > height as usize * width as usize {
        return Err("too_many_mines".to_string());
    }
    let mut rng = rand::rng();
    let game = ms::Game::new(height as usize, width as usize, mines as usize, &mut rng);
    ms::Session::new(game).serialize().map_err(|e| e.to_string())
}

/// Lets the bot play one move. The returned bytes are the new session with a
/// trailing status byte from [`status_code`].
#[wasm_bindgen]
pub fn step(bts: Vec<u8>) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut session = ms::Session::deserialize(&bts).map_err(|e| e.to_string())?;
    let outcome = session
        .step(&mut rand::rng())
        .map_err(|e| e.to_string())?;
    let mut xs = session.serialize().map_err(|e| e.to_string())?;
    xs.push(match outcome {
        ms::StepOutcome::NoMoves => 3,
        _ => status_code(session.game.game_state),
    });
    Ok(xs)
}

#[wasm_bindgen]
pub fn status(bts: Vec<u8>) -> Result<u8, String> {
    console_error_panic_hook::set_once();

    let session = ms::Session::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(status_code(session.game.game_state))
}

#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    let session = ms::Session::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(session
        .game
        .board
        .into_iter()
        .flat_map(|row| {
            row.into_iter().map(|tile| match tile {
                ms::Tile::Hidden => -1,
                ms::Tile::Flagged => -2,
                ms::Tile::Revealed(n) => n as i8,
            })
        })
        .collect())
}

/// 0 playing, 1 won, 2 lost. `step` also uses 3 for "no moves left".
fn status_code(state: ms::GameState) -> u8 {
    match state {
        ms::GameState::Playing => 0,
        ms::GameState::Won => 1,
        ms::GameState::Lost => 2,
    }
}
