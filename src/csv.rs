use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::model::{Count, Item, Request, SlotId};
use crate::protocol::Response;
use crate::Amount;

/// Errors that can occur when parsing csv rows
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open {path}: {source}")]
    Open { path: String, source: csv::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized operation '{op}'")]
    UnrecognizedOp { line: usize, op: String },

    #[error("line {line}: {op} missing slot")]
    MissingSlot { line: usize, op: String },

    #[error("line {line}: invalid {field} '{value}'")]
    InvalidAmount {
        line: usize,
        field: &'static str,
        value: String,
    },
}

/// Errors that can occur when writing a response row
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write row: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to render body: {0}")]
    Body(#[from] serde_json::Error),
}

/// One provisioned slot, as read from an inventory file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRow {
    pub slot: SlotId,
    pub item: Item,
    pub stock: Count,
}

#[derive(Debug, Deserialize)]
struct InventoryRow {
    slot: SlotId,
    name: String,
    verbose_name: Option<String>,
    volume: String,
    price: String,
    stock: Count,
}

#[derive(Debug, Deserialize)]
struct CommandRow {
    op: String,
    slot: Option<SlotId>,
    coin: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    op: &'a str,
    slot: Option<SlotId>,
    status: u16,
    coins: Option<Count>,
    remaining: Option<Count>,
    body: Option<String>,
}

fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>, CsvError> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| CsvError::Open {
            path: path.display().to_string(),
            source,
        })
}

/// Parse a non-negative amount column.
fn amount(line: usize, field: &'static str, value: String) -> Result<Amount, CsvError> {
    match value.parse::<Amount>() {
        Ok(amount) if !amount.is_negative() => Ok(amount),
        _ => Err(CsvError::InvalidAmount { line, field, value }),
    }
}

/// Read slots to provision from a csv file
pub fn read_inventory(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<SlotRow, CsvError>>, CsvError> {
    let reader = reader(path.as_ref())?;

    Ok(reader
        .into_deserialize::<InventoryRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            let volume = amount(line, "volume", row.volume)?;
            let price = amount(line, "price", row.price)?;
            let mut item = Item::new(row.name, volume, price);
            if let Some(verbose_name) = row.verbose_name.filter(|v| !v.is_empty()) {
                item = item.with_verbose_name(verbose_name);
            }
            Ok(SlotRow {
                slot: row.slot,
                item,
                stock: row.stock,
            })
        }))
}

/// Read requests from a csv file
pub fn read_commands(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<Request, CsvError>>, CsvError> {
    let reader = reader(path.as_ref())?;

    Ok(reader
        .into_deserialize::<CommandRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            match row.op.as_str() {
                "peek" => Ok(Request::PeekCoins),
                "insert" => Ok(Request::InsertCoins {
                    coin: row.coin.filter(|c| !c.is_empty()),
                }),
                "drain" => Ok(Request::DrainCoins),
                "purchase" => {
                    let slot = row.slot.ok_or_else(|| CsvError::MissingSlot {
                        line,
                        op: "purchase".to_string(),
                    })?;
                    Ok(Request::Purchase { slot })
                }
                "refill" => Ok(Request::Refill),
                "list" => Ok(Request::ListSlots),
                other => Err(CsvError::UnrecognizedOp {
                    line,
                    op: other.to_string(),
                }),
            }
        }))
}

/// Collects responses and writes them to stdout in csv format
pub struct ResponseWriter<W: io::Write> {
    writer: csv::Writer<W>,
}

impl ResponseWriter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: io::Write> ResponseWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(out),
        }
    }

    pub fn write(&mut self, request: &Request, response: &Response) -> Result<(), WriteError> {
        self.writer.serialize(OutputRow {
            op: request.op(),
            slot: request.slot(),
            status: response.status.code(),
            coins: response.coins,
            remaining: response.remaining,
            body: response.body_json()?,
        })?;
        Ok(())
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|err| io::Error::other(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Status;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn read_inventory_rows() {
        let file = write_csv(
            "slot,name,verbose_name,volume,price,stock\n\
             1,coke,Coca-Cola,0.33,0.5,5\n\
             2, water ,,0.5,0.25,0\n",
        );
        let rows: Vec<_> = read_inventory(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].slot, 1);
        assert_eq!(rows[0].item.verbose_name, "Coca-Cola");
        assert_eq!(rows[0].item.price, Amount::from_scaled(5_000));
        assert_eq!(rows[0].item.volume, Amount::from_scaled(3_300));
        assert_eq!(rows[1].item.name, "water");
        assert_eq!(rows[1].item.verbose_name, "water");
        assert_eq!(rows[1].stock, 0);
    }

    #[test]
    fn read_inventory_rejects_bad_price() {
        let file = write_csv("slot,name,verbose_name,volume,price,stock\n1,coke,,0.33,cheap,5\n");
        let results: Vec<_> = read_inventory(file.path()).unwrap().collect();
        assert!(matches!(
            results[0],
            Err(CsvError::InvalidAmount {
                line: 2,
                field: "price",
                ..
            })
        ));
    }

    #[test]
    fn read_inventory_rejects_negative_amounts() {
        let file = write_csv(
            "slot,name,verbose_name,volume,price,stock\n\
             1,coke,,0.33,-0.5,5\n\
             2,water,,-0.5,0.25,5\n\
             3,sample,,0.1,0,1\n",
        );
        let results: Vec<_> = read_inventory(file.path()).unwrap().collect();

        assert!(matches!(
            &results[0],
            Err(CsvError::InvalidAmount {
                line: 2,
                field: "price",
                value,
            }) if value == "-0.5"
        ));
        assert!(matches!(
            results[1],
            Err(CsvError::InvalidAmount {
                line: 3,
                field: "volume",
                ..
            })
        ));
        assert!(matches!(&results[2], Ok(row) if row.item.price == Amount::default()));
    }

    #[test]
    fn read_commands_rows() {
        let file = write_csv(
            "op,slot,coin\n\
             insert,,3\n\
             insert,,\n\
             purchase,2,\n\
             peek,,\n\
             drain,,\n\
             refill,,\n\
             list,,\n",
        );
        let requests: Vec<_> = read_commands(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(
            requests,
            [
                Request::InsertCoins {
                    coin: Some("3".to_string())
                },
                Request::InsertCoins { coin: None },
                Request::Purchase { slot: 2 },
                Request::PeekCoins,
                Request::DrainCoins,
                Request::Refill,
                Request::ListSlots,
            ]
        );
    }

    #[test]
    fn read_commands_keeps_non_integer_coin_for_validation() {
        let file = write_csv("op,slot,coin\ninsert,,abc\n");
        let results: Vec<_> = read_commands(file.path()).unwrap().collect();
        assert!(matches!(
            &results[0],
            Ok(Request::InsertCoins { coin: Some(c) }) if c == "abc"
        ));
    }

    #[test]
    fn read_commands_errors() {
        let file = write_csv("op,slot,coin\nbuy,1,\npurchase,,\n");
        let results: Vec<_> = read_commands(file.path()).unwrap().collect();
        assert!(matches!(
            results[0],
            Err(CsvError::UnrecognizedOp { line: 2, .. })
        ));
        assert!(matches!(results[1], Err(CsvError::MissingSlot { line: 3, .. })));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(matches!(
            read_commands("does/not/exist.csv"),
            Err(CsvError::Open { .. })
        ));
    }

    #[test]
    fn writes_responses() {
        let mut writer = ResponseWriter::new(Vec::new());
        let response = Response {
            status: Status::Ok,
            body: None,
            coins: Some(1),
            remaining: Some(4),
            reason: None,
        };
        writer
            .write(&Request::Purchase { slot: 1 }, &response)
            .unwrap();
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();

        assert_eq!(
            out,
            "op,slot,status,coins,remaining,body\npurchase,1,200,1,4,\n"
        );
    }

    #[test]
    fn writes_rendered_body() {
        let mut writer = ResponseWriter::new(Vec::new());
        let response = Response::purchase(Ok(crate::model::Purchase {
            quantity: 1,
            remaining: 2,
            coins: 0,
        }));
        writer
            .write(&Request::Purchase { slot: 3 }, &response)
            .unwrap();
        let out = String::from_utf8(writer.finish().unwrap()).unwrap();

        assert_eq!(
            out,
            "op,slot,status,coins,remaining,body\npurchase,3,200,0,2,\"{\"\"quantity\"\":1}\"\n"
        );
    }
}
