use anyhow::{Result, anyhow};
use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    StartSelection,
    ReadAloud,
    StopSpeech,
}

/// System-wide hotkeys, usable while the window is hidden or unfocused:
/// Ctrl+Shift+S select, Ctrl+Shift+R read, Ctrl+Shift+X stop.
pub struct HotkeyManager {
    // Registrations are dropped with the manager.
    _manager: GlobalHotKeyManager,
    bindings: Vec<(HotKey, HotkeyAction)>,
}

impl HotkeyManager {
    pub fn new() -> Result<Self> {
        let manager = GlobalHotKeyManager::new()
            .map_err(|err| anyhow!("hotkey manager init failed: {err}"))?;
        let modifiers = Modifiers::CONTROL | Modifiers::SHIFT;
        let bindings = vec![
            (
                HotKey::new(Some(modifiers), Code::KeyS),
                HotkeyAction::StartSelection,
            ),
            (
                HotKey::new(Some(modifiers), Code::KeyR),
                HotkeyAction::ReadAloud,
            ),
            (
                HotKey::new(Some(modifiers), Code::KeyX),
                HotkeyAction::StopSpeech,
            ),
        ];
        for (hotkey, action) in &bindings {
            manager
                .register(*hotkey)
                .map_err(|err| anyhow!("failed to register hotkey for {action:?}: {err}"))?;
            info!("registered {} for {action:?}", hotkey.into_string());
        }
        Ok(Self {
            _manager: manager,
            bindings,
        })
    }

    pub fn poll(&self) -> Option<HotkeyAction> {
        let event = GlobalHotKeyEvent::receiver().try_recv().ok()?;
        if event.state != HotKeyState::Pressed {
            return None;
        }
        self.bindings
            .iter()
            .find(|(hotkey, _)| hotkey.id == event.id)
            .map(|(_, action)| *action)
    }
}
