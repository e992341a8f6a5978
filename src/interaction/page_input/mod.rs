use bevy::prelude::*;

use crate::core::system::system_order::{ManagerCommandSet, PageInputSet};
use crate::gameplay::doctor::Doctor;
use crate::gameplay::manager::{BeginCleanup, SetDiagnostics};
use crate::page::document::{Page, PageEvent};

/// Turns raw page input into doctor deaths and manager commands.
pub struct PageInputPlugin;

impl Plugin for PageInputPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(Update, PageInputSet.before(ManagerCommandSet))
            .add_systems(Update, drain_page_events.in_set(PageInputSet));
    }
}

fn drain_page_events(
    mut page: NonSendMut<Page>,
    mut q_doctors: Query<&mut Doctor>,
    mut cleanup: EventWriter<BeginCleanup>,
    mut diagnostics: EventWriter<SetDiagnostics>,
) {
    for event in page.drain_events() {
        match event {
            PageEvent::SpriteClicked(el) => {
                if let Some(mut doctor) = q_doctors.iter_mut().find(|d| d.element == el) {
                    debug!(target: "input", "Doctor {el} clicked");
                    doctor.die();
                }
            }
            PageEvent::CleanupRequested => {
                cleanup.write(BeginCleanup);
            }
            PageEvent::DiagnosticsToggled(enabled) => {
                diagnostics.write(SetDiagnostics(enabled));
            }
        }
    }
}
