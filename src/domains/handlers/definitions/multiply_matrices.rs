//! Matrix multiplication handler.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domains::handlers::{Handler, HandlerError};

/// Request for the matrix multiplication handler.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MultiplyMatricesRequest {
    /// The first matrix to be multiplied
    pub matrix1: Vec<Vec<f64>>,

    /// The second matrix to be multiplied
    pub matrix2: Vec<Vec<f64>>,
}

/// Response of the matrix multiplication handler.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct MultiplyMatricesResponse {
    /// The result of the matrix multiplication
    pub result: Vec<Vec<f64>>,
}

/// Multiplies two matrices.
pub struct MultiplyMatricesHandler;

impl Handler for MultiplyMatricesHandler {
    const NAME: &'static str = "multiply_matrices";
    const DESCRIPTION: &'static str = "Multiplies two matrices.";

    type Request = MultiplyMatricesRequest;
    type Response = MultiplyMatricesResponse;

    fn invoke(
        &self,
        request: MultiplyMatricesRequest,
    ) -> Result<MultiplyMatricesResponse, HandlerError> {
        let lhs = &request.matrix1;
        let rhs = &request.matrix2;

        let inner = rhs.len();
        let cols = rhs.first().map_or(0, Vec::len);

        if rhs.iter().any(|row| row.len() != cols) {
            return Err(HandlerError::invalid_input("matrix2 rows differ in length"));
        }
        if let Some(row) = lhs.iter().find(|row| row.len() != inner) {
            return Err(HandlerError::invalid_input(format!(
                "cannot multiply: matrix1 row has {} columns, matrix2 has {} rows",
                row.len(),
                inner
            )));
        }

        let result: Vec<Vec<f64>> = lhs
            .iter()
            .map(|row| {
                (0..cols)
                    .map(|j| row.iter().zip(rhs).map(|(a, r)| a * r[j]).sum::<f64>())
                    .collect()
            })
            .collect();

        Ok(MultiplyMatricesResponse { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiply() {
        let response = MultiplyMatricesHandler
            .invoke(MultiplyMatricesRequest {
                matrix1: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
                matrix2: vec![vec![5.0, 6.0], vec![7.0, 8.0]],
            })
            .unwrap();
        assert_eq!(response.result, vec![vec![19.0, 22.0], vec![43.0, 50.0]]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = MultiplyMatricesHandler.invoke(MultiplyMatricesRequest {
            matrix1: vec![vec![1.0, 2.0, 3.0]],
            matrix2: vec![vec![1.0], vec![2.0]],
        });
        assert!(result.is_err());
    }
}
