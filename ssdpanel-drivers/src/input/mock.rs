//! Scripted GPIO interface for input tests

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use ssdpanel_hal::{Direction, Edge, GpioError, GpioSysfs, GpioValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Export(u8),
    Direction(u8, Direction),
    Edge(u8, Edge),
    Open(u8),
    Close(u8),
}

#[derive(Default)]
struct Failures {
    export: Option<GpioError>,
    edge: Option<GpioError>,
    read: Option<GpioError>,
    close: Option<GpioError>,
}

/// Records every call; each opened line replays its scripted value bytes,
/// one per change notification, then fails with [`GpioError::Io`]
#[derive(Default)]
pub struct MockGpio {
    calls: Rc<RefCell<Vec<Call>>>,
    scripts: RefCell<HashMap<u8, VecDeque<u8>>>,
    failures: Failures,
}

impl MockGpio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_changes(self, line: u8, values: &[u8]) -> Self {
        self.scripts
            .borrow_mut()
            .entry(line)
            .or_default()
            .extend(values.iter().copied());
        self
    }

    pub fn with_export_error(mut self, error: GpioError) -> Self {
        self.failures.export = Some(error);
        self
    }

    pub fn with_edge_error(mut self, error: GpioError) -> Self {
        self.failures.edge = Some(error);
        self
    }

    pub fn with_read_error(mut self, error: GpioError) -> Self {
        self.failures.read = Some(error);
        self
    }

    pub fn with_close_error(mut self, error: GpioError) -> Self {
        self.failures.close = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl GpioSysfs for MockGpio {
    type Value = MockValue;

    async fn export(&self, line: u8) -> Result<(), GpioError> {
        self.record(Call::Export(line));
        self.failures.export.map_or(Ok(()), Err)
    }

    async fn set_direction(&self, line: u8, direction: Direction) -> Result<(), GpioError> {
        self.record(Call::Direction(line, direction));
        Ok(())
    }

    async fn set_edge(&self, line: u8, edge: Edge) -> Result<(), GpioError> {
        self.record(Call::Edge(line, edge));
        match (edge, self.failures.edge) {
            (Edge::Both, Some(e)) => Err(e),
            _ => Ok(()),
        }
    }

    async fn open_value(&self, line: u8) -> Result<MockValue, GpioError> {
        self.record(Call::Open(line));
        Ok(MockValue {
            line,
            level: b'1',
            script: self.scripts.borrow_mut().remove(&line).unwrap_or_default(),
            calls: Rc::clone(&self.calls),
            read_error: self.failures.read,
            close_error: self.failures.close,
        })
    }
}

pub struct MockValue {
    line: u8,
    level: u8,
    script: VecDeque<u8>,
    calls: Rc<RefCell<Vec<Call>>>,
    read_error: Option<GpioError>,
    close_error: Option<GpioError>,
}

impl GpioValue for MockValue {
    async fn read(&mut self) -> Result<u8, GpioError> {
        self.read_error.map_or(Ok(self.level), Err)
    }

    async fn wait_for_change(&mut self) -> Result<(), GpioError> {
        self.level = self.script.pop_front().ok_or(GpioError::Io)?;
        Ok(())
    }

    async fn close(self) -> Result<(), GpioError> {
        self.calls.borrow_mut().push(Call::Close(self.line));
        self.close_error.map_or(Ok(()), Err)
    }
}
