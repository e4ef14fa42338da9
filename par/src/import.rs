//! Importing devices into a [`Layout`].

use devir::{Component, Connection, Device, Target, COMPONENT_SPACING_PARAM};
use tracing::{span, Level};

use crate::cell::{Cell, Terminal};
use crate::error::{LayoutError, Result};
use crate::issues::{Cause, ImportIssue, ImportIssues, Severity};
use crate::net::{Net, TerminalRef};
use crate::Layout;

impl Layout {
    /// Imports the components and connections of `device`.
    ///
    /// Replaces any previously imported cells and nets.
    /// Endpoints that cannot be resolved are left unresolved and reported;
    /// they never abort the import.
    pub fn import_without_constraints(&mut self, device: &Device) -> ImportIssues {
        let _guard = span!(Level::INFO, "importing device", device = %device.name()).entered();
        self.cells.clear();
        self.nets.clear();

        for component in device.components() {
            let cell = self.import_component(component);
            self.cells.insert(cell.id.clone(), cell);
        }

        let mut issues = ImportIssues::new();
        for connection in device.connections() {
            let net = self.import_connection(connection, &mut issues);
            self.nets.insert(net.id.clone(), net);
        }
        tracing::debug!(
            cells = self.cells.len(),
            nets = self.nets.len(),
            issues = issues.len(),
            "imported device"
        );
        issues
    }

    /// Imports a device while honoring its layout constraints.
    ///
    /// Constraint-driven import is not supported; this always fails.
    pub fn import_with_constraints(&mut self, _device: &Device) -> Result<ImportIssues> {
        Err(LayoutError::NotSupported("constraint-aware import"))
    }

    fn import_component(&self, component: &Component) -> Cell {
        let q = self.quantizer;
        let position = component.position();
        let terminal_origin = q.floor_point(position);

        let terminals = component
            .ports
            .iter()
            .map(|port| {
                let mut t = Terminal::new(port.label.clone(), q.floor(port.x), q.floor(port.y));
                tracing::debug!(component = %component.id, port = %t.label, x = t.x, y = t.y, "relative terminal");
                t.compute_absolute_position(terminal_origin);
                tracing::debug!(component = %component.id, port = %t.label, x = t.x, y = t.y, "absolute terminal");
                t
            })
            .collect();

        let spacing = component
            .params
            .get_int(COMPONENT_SPACING_PARAM)
            .unwrap_or(self.config.component_spacing);
        let origin = q.round_point(position);

        Cell {
            id: component.id.clone(),
            x: origin.x,
            y: origin.y,
            x_span: q.round(component.x_span),
            y_span: q.round(component.y_span),
            spacing: q.round(spacing),
            terminals,
        }
    }

    fn import_connection(&self, connection: &Connection, issues: &mut ImportIssues) -> Net {
        let source = self.resolve_endpoint(connection, &connection.source, issues);
        let sinks: Vec<_> = connection
            .sinks
            .iter()
            .map(|sink| self.resolve_endpoint(connection, sink, issues))
            .collect();
        Net::new(connection.id.clone(), source, sinks)
    }

    fn resolve_endpoint(
        &self,
        connection: &Connection,
        target: &Target,
        issues: &mut ImportIssues,
    ) -> Option<TerminalRef> {
        let Some(cell) = self.cells.get(&target.component) else {
            issues.add(ImportIssue::new_and_log(
                Cause::MissingCell {
                    connection: connection.id.clone(),
                    component: target.component.clone(),
                },
                Severity::Warning,
            ));
            return None;
        };
        let Some(port) = &target.port else {
            issues.add(ImportIssue::new_and_log(
                Cause::UnspecifiedPort {
                    connection: connection.id.clone(),
                    component: target.component.clone(),
                },
                Severity::Info,
            ));
            return None;
        };
        match cell.terminal(port) {
            Some((index, _)) => Some(TerminalRef {
                cell: cell.id.clone(),
                index,
            }),
            None => {
                issues.add(ImportIssue::new_and_log(
                    Cause::MissingTerminal {
                        connection: connection.id.clone(),
                        component: target.component.clone(),
                        port: port.clone(),
                    },
                    Severity::Warning,
                ));
                None
            }
        }
    }
}
