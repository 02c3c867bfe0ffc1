//! Wire format of the display bridge
//!
//! Newline-delimited JSON requests, one per frame. The bridge does not reply.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grid::Grid;

pub mod methods {
    pub const GRID_UPDATE: &str = "grid.update";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRequest {
    pub id: Uuid,
    pub method: String,
    pub params: FrameParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameParams {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Vec<bool>>,
}

impl FrameRequest {
    pub fn update(grid: &Grid) -> Self {
        Self {
            id: Uuid::new_v4(),
            method: methods::GRID_UPDATE.to_string(),
            params: FrameParams {
                rows: grid.rows(),
                cols: grid.cols(),
                cells: grid.to_rows(),
            },
        }
    }

    /// The frame carried by this request, if its cells match its dimensions
    pub fn to_grid(&self) -> Option<Grid> {
        if self.params.rows == 0 || self.params.cols == 0 {
            return Some(Grid::new(self.params.rows, self.params.cols));
        }
        Grid::from_rows(&self.params.cells)
            .filter(|g| g.dimensions() == (self.params.rows, self.params.cols))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let grid = Grid::from_fn(2, 3, |r, c| r == 0 && c == 1);
        let json = serde_json::to_string(&FrameRequest::update(&grid)).unwrap();
        assert!(json.contains("\"method\":\"grid.update\""));
        assert!(json.contains("\"cells\":[[false,true,false],[false,false,false]]"));
    }

    #[test]
    fn test_inconsistent_dimensions_rejected() {
        let mut request = FrameRequest::update(&Grid::new(2, 2));
        request.params.rows = 3;
        assert!(request.to_grid().is_none());
    }
}
