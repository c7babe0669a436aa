//! GDI preview window

use std::ffi::c_void;

use windows::core::{w, Error, Result, PCWSTR};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    CreateFontW, DeleteObject, UpdateWindow, CLEARTYPE_QUALITY, CLIP_DEFAULT_PRECIS,
    COLOR_WINDOW, DEFAULT_CHARSET, DEFAULT_PITCH, FF_DONTCARE, HBRUSH, HGDIOBJ,
    OUT_DEFAULT_PRECIS,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreateMenu, CreatePopupMenu, CreateWindowExW, DefWindowProcW, DestroyWindow,
    DispatchMessageW, GetMessageW, GetSystemMetrics, LoadCursorW, PostQuitMessage,
    RegisterClassExW, SendMessageW, ShowWindow, TranslateMessage, CS_HREDRAW, CS_VREDRAW,
    ES_MULTILINE, ES_READONLY, HMENU, IDC_ARROW, MF_POPUP, MF_STRING, MSG, SM_CXSCREEN,
    SM_CYSCREEN, SW_SHOW, WINDOW_EX_STYLE, WINDOW_STYLE, WM_COMMAND, WM_DESTROY, WM_SETFONT,
    WNDCLASSEXW, WS_CAPTION, WS_CHILD, WS_EX_CLIENTEDGE, WS_MINIMIZEBOX, WS_OVERLAPPED,
    WS_SYSMENU, WS_VISIBLE, WS_VSCROLL,
};

use crate::preview::{centered_origin, sample_text, FontStyle, SAMPLE_POINTS, WINDOW_SIZE};

const ID_FILE_EXIT: usize = 1001;

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

pub fn show(face: &str, style: FontStyle) -> Result<()> {
    let face = wide(face);
    let text = wide(&sample_text());

    unsafe {
        let instance: HINSTANCE = GetModuleHandleW(None)?.into();

        let class_name = w!("FontctlPreviewWindow");
        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(wnd_proc),
            hInstance: instance,
            hCursor: LoadCursorW(None, IDC_ARROW)?,
            hbrBackground: HBRUSH((COLOR_WINDOW.0 + 1) as *mut c_void),
            lpszClassName: class_name,
            ..Default::default()
        };
        if RegisterClassExW(&wc) == 0 {
            return Err(Error::from_win32());
        }

        // Alt+F4 itself is handled by the system menu.
        let file_menu = CreatePopupMenu()?;
        AppendMenuW(file_menu, MF_STRING, ID_FILE_EXIT, w!("E&xit\tAlt+F4"))?;
        let menu_bar = CreateMenu()?;
        AppendMenuW(menu_bar, MF_POPUP, file_menu.0 as usize, w!("&File"))?;

        let screen = (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN));
        let (x, y) = centered_origin(screen, WINDOW_SIZE);

        // Fixed size: no thick frame, no maximize box.
        let hwnd = CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            class_name,
            w!("fontctl Preview"),
            WS_OVERLAPPED | WS_CAPTION | WS_SYSMENU | WS_MINIMIZEBOX,
            x,
            y,
            WINDOW_SIZE.0,
            WINDOW_SIZE.1,
            HWND::default(),
            menu_bar,
            instance,
            None,
        )?;

        let edit = CreateWindowExW(
            WS_EX_CLIENTEDGE,
            w!("EDIT"),
            PCWSTR(text.as_ptr()),
            WS_CHILD | WS_VISIBLE | WS_VSCROLL | WINDOW_STYLE((ES_MULTILINE | ES_READONLY) as u32),
            10,
            10,
            WINDOW_SIZE.0 - 30,
            300,
            hwnd,
            HMENU::default(),
            instance,
            None,
        )?;

        // Negative height selects by character height; 96 DPI assumed.
        let font = CreateFontW(
            -(SAMPLE_POINTS * 96 / 72),
            0,
            0,
            0,
            style.weight(),
            u32::from(style.is_italic()),
            0,
            0,
            DEFAULT_CHARSET.0 as u32,
            OUT_DEFAULT_PRECIS.0 as u32,
            CLIP_DEFAULT_PRECIS.0 as u32,
            CLEARTYPE_QUALITY.0 as u32,
            (DEFAULT_PITCH.0 | FF_DONTCARE.0) as u32,
            PCWSTR(face.as_ptr()),
        );
        let _ = SendMessageW(edit, WM_SETFONT, WPARAM(font.0 as usize), LPARAM(1));

        let _ = ShowWindow(hwnd, SW_SHOW);
        let _ = UpdateWindow(hwnd);

        let mut msg = MSG::default();
        while GetMessageW(&mut msg, None, 0, 0).into() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }

        let _ = DeleteObject(HGDIOBJ(font.0));
    }

    Ok(())
}

unsafe extern "system" fn wnd_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_COMMAND if wparam.0 & 0xFFFF == ID_FILE_EXIT => {
            let _ = DestroyWindow(hwnd);
            LRESULT(0)
        }
        WM_DESTROY => {
            PostQuitMessage(0);
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
