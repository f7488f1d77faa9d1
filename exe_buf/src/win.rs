use std::io;
use std::ptr::null_mut;
use winapi::um::winnt::*;

pub fn page_size() -> usize {
    let mut sys_info: winapi::um::sysinfoapi::SYSTEM_INFO = unsafe { std::mem::zeroed() };
    unsafe { winapi::um::sysinfoapi::GetSystemInfo(&mut sys_info); }
    sys_info.dwPageSize as usize
}

// Reserve and commit in one go: the buffer is written front to back
// and may be executed at any point, so every page has to be backed.
pub fn map_rwx(size: usize) -> io::Result<*mut u8> {
    let ptr = unsafe {
        winapi::um::memoryapi::VirtualAlloc(
            null_mut(),
            size,
            MEM_RESERVE | MEM_COMMIT,
            PAGE_EXECUTE_READWRITE,
        )
    };
    if ptr.is_null() {
        return Err(io::Error::last_os_error());
    }
    Ok(ptr as *mut u8)
}

/// # Safety
/// `ptr` must be the base of a live allocation returned by `map_rwx`.
pub unsafe fn unmap(ptr: *mut u8, _size: usize) -> io::Result<()> {
    // MEM_RELEASE requires size 0 and frees the whole reservation.
    if winapi::um::memoryapi::VirtualFree(ptr as *mut _, 0, MEM_RELEASE) == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
