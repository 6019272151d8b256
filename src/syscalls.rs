//! Per-personality syscall tables
//!
//! Each supported ABI personality numbers its syscalls independently and
//! tags every syscall with classification flags (`%file`, `%network`, ...).
//! Selectors are always resolved against every personality.

use bitflags::bitflags;
use serde::Serialize;

bitflags! {
    /// Classification flags attached to each syscall
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct SyscallClass: u32 {
        /// Takes a file descriptor argument
        const DESC = 1 << 0;
        /// Takes a filename argument
        const FILE = 1 << 1;
        const IPC = 1 << 2;
        const NETWORK = 1 << 3;
        const PROCESS = 1 << 4;
        const SIGNAL = 1 << 5;
        const MEMORY = 1 << 6;
        const STAT = 1 << 7;
        const LSTAT = 1 << 8;
        const FSTAT = 1 << 9;
        /// Any of the stat family
        const STAT_LIKE = 1 << 10;
        const STATFS = 1 << 11;
        const FSTATFS = 1 << 12;
        /// Any of the statfs family
        const STATFS_LIKE = 1 << 13;
    }
}

/// One row of a syscall table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyscallEntry {
    /// `None` marks an unallocated number
    pub name: Option<&'static str>,
    pub flags: SyscallClass,
}

impl SyscallEntry {
    pub const fn new(name: &'static str, flags: SyscallClass) -> Self {
        Self {
            name: Some(name),
            flags,
        }
    }

    pub const fn unallocated() -> Self {
        Self {
            name: None,
            flags: SyscallClass::empty(),
        }
    }
}

/// Syscall table of a single ABI personality, indexed by syscall number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyscallTable {
    pub abi: &'static str,
    entries: Vec<SyscallEntry>,
}

impl SyscallTable {
    pub fn new(abi: &'static str, entries: Vec<SyscallEntry>) -> Self {
        Self { abi, entries }
    }

    /// Number of syscall slots, allocated or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, number: u32) -> Option<&SyscallEntry> {
        self.entries.get(number as usize)
    }

    /// Resolve syscall number to name
    pub fn name_of(&self, number: u32) -> Option<&'static str> {
        self.get(number).and_then(|entry| entry.name)
    }

    /// Resolve a name to its syscall number (case-sensitive)
    pub fn number_of(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .position(|entry| entry.name == Some(name))
            .map(|n| n as u32)
    }

    /// Iterate over allocated `(number, entry)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (u32, &'static str, SyscallClass)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(n, entry)| entry.name.map(|name| (n as u32, name, entry.flags)))
    }
}

/// The set of personalities a tracer supports, in personality-number order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Personalities {
    tables: Vec<SyscallTable>,
}

impl Personalities {
    /// Build from explicit tables.
    ///
    /// # Panics
    ///
    /// Panics if `tables` is empty; use [`Personalities::try_new`] for
    /// tables that come from user input.
    pub fn new(tables: Vec<SyscallTable>) -> Self {
        match Self::try_new(tables) {
            Some(personalities) => personalities,
            None => panic!("at least one personality is required"),
        }
    }

    /// Build from explicit tables, or `None` if there are none
    pub fn try_new(tables: Vec<SyscallTable>) -> Option<Self> {
        if tables.is_empty() {
            return None;
        }
        Some(Self { tables })
    }

    /// The built-in x86_64 personality
    pub fn native() -> Self {
        Self {
            tables: vec![x86_64()],
        }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn get(&self, personality: usize) -> Option<&SyscallTable> {
        self.tables.get(personality)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SyscallTable> {
        self.tables.iter()
    }
}

impl Default for Personalities {
    fn default() -> Self {
        Self::native()
    }
}

const TD: u32 = SyscallClass::DESC.bits();
const TF: u32 = SyscallClass::FILE.bits();
const TI: u32 = SyscallClass::IPC.bits();
const TN: u32 = SyscallClass::NETWORK.bits();
const TP: u32 = SyscallClass::PROCESS.bits();
const TS: u32 = SyscallClass::SIGNAL.bits();
const TM: u32 = SyscallClass::MEMORY.bits();
const TST: u32 = SyscallClass::STAT.bits();
const TLST: u32 = SyscallClass::LSTAT.bits();
const TFST: u32 = SyscallClass::FSTAT.bits();
const TSTA: u32 = SyscallClass::STAT_LIKE.bits();
const TSF: u32 = SyscallClass::STATFS.bits();
const TFSF: u32 = SyscallClass::FSTATFS.bits();
const TSFA: u32 = SyscallClass::STATFS_LIKE.bits();

/// x86_64 syscall table, index = syscall number
static X86_64: &[(&str, u32)] = &[
    /*   0 */ ("read", TD),
    /*   1 */ ("write", TD),
    /*   2 */ ("open", TD|TF),
    /*   3 */ ("close", TD),
    /*   4 */ ("stat", TF|TST|TSTA),
    /*   5 */ ("fstat", TD|TFST|TSTA),
    /*   6 */ ("lstat", TF|TLST|TSTA),
    /*   7 */ ("poll", TD),
    /*   8 */ ("lseek", TD),
    /*   9 */ ("mmap", TD|TM),
    /*  10 */ ("mprotect", TM),
    /*  11 */ ("munmap", TM),
    /*  12 */ ("brk", TM),
    /*  13 */ ("rt_sigaction", TS),
    /*  14 */ ("rt_sigprocmask", TS),
    /*  15 */ ("rt_sigreturn", TS),
    /*  16 */ ("ioctl", TD),
    /*  17 */ ("pread64", TD),
    /*  18 */ ("pwrite64", TD),
    /*  19 */ ("readv", TD),
    /*  20 */ ("writev", TD),
    /*  21 */ ("access", TF),
    /*  22 */ ("pipe", TD),
    /*  23 */ ("select", TD),
    /*  24 */ ("sched_yield", 0),
    /*  25 */ ("mremap", TM),
    /*  26 */ ("msync", TM),
    /*  27 */ ("mincore", TM),
    /*  28 */ ("madvise", TM),
    /*  29 */ ("shmget", TI),
    /*  30 */ ("shmat", TI|TM),
    /*  31 */ ("shmctl", TI),
    /*  32 */ ("dup", TD),
    /*  33 */ ("dup2", TD),
    /*  34 */ ("pause", TS),
    /*  35 */ ("nanosleep", 0),
    /*  36 */ ("getitimer", 0),
    /*  37 */ ("alarm", 0),
    /*  38 */ ("setitimer", 0),
    /*  39 */ ("getpid", 0),
    /*  40 */ ("sendfile", TD|TN),
    /*  41 */ ("socket", TN),
    /*  42 */ ("connect", TN),
    /*  43 */ ("accept", TN),
    /*  44 */ ("sendto", TN),
    /*  45 */ ("recvfrom", TN),
    /*  46 */ ("sendmsg", TN),
    /*  47 */ ("recvmsg", TN),
    /*  48 */ ("shutdown", TN),
    /*  49 */ ("bind", TN),
    /*  50 */ ("listen", TN),
    /*  51 */ ("getsockname", TN),
    /*  52 */ ("getpeername", TN),
    /*  53 */ ("socketpair", TN),
    /*  54 */ ("setsockopt", TN),
    /*  55 */ ("getsockopt", TN),
    /*  56 */ ("clone", TP),
    /*  57 */ ("fork", TP),
    /*  58 */ ("vfork", TP),
    /*  59 */ ("execve", TF|TP),
    /*  60 */ ("exit", TP),
    /*  61 */ ("wait4", TP),
    /*  62 */ ("kill", TS),
    /*  63 */ ("uname", 0),
    /*  64 */ ("semget", TI),
    /*  65 */ ("semop", TI),
    /*  66 */ ("semctl", TI),
    /*  67 */ ("shmdt", TI|TM),
    /*  68 */ ("msgget", TI),
    /*  69 */ ("msgsnd", TI),
    /*  70 */ ("msgrcv", TI),
    /*  71 */ ("msgctl", TI),
    /*  72 */ ("fcntl", TD),
    /*  73 */ ("flock", TD),
    /*  74 */ ("fsync", TD),
    /*  75 */ ("fdatasync", TD),
    /*  76 */ ("truncate", TF),
    /*  77 */ ("ftruncate", TD),
    /*  78 */ ("getdents", TD),
    /*  79 */ ("getcwd", TF),
    /*  80 */ ("chdir", TF),
    /*  81 */ ("fchdir", TD),
    /*  82 */ ("rename", TF),
    /*  83 */ ("mkdir", TF),
    /*  84 */ ("rmdir", TF),
    /*  85 */ ("creat", TD|TF),
    /*  86 */ ("link", TF),
    /*  87 */ ("unlink", TF),
    /*  88 */ ("symlink", TF),
    /*  89 */ ("readlink", TF),
    /*  90 */ ("chmod", TF),
    /*  91 */ ("fchmod", TD),
    /*  92 */ ("chown", TF),
    /*  93 */ ("fchown", TD),
    /*  94 */ ("lchown", TF),
    /*  95 */ ("umask", 0),
    /*  96 */ ("gettimeofday", 0),
    /*  97 */ ("getrlimit", 0),
    /*  98 */ ("getrusage", 0),
    /*  99 */ ("sysinfo", 0),
    /* 100 */ ("times", 0),
    /* 101 */ ("ptrace", 0),
    /* 102 */ ("getuid", 0),
    /* 103 */ ("syslog", 0),
    /* 104 */ ("getgid", 0),
    /* 105 */ ("setuid", 0),
    /* 106 */ ("setgid", 0),
    /* 107 */ ("geteuid", 0),
    /* 108 */ ("getegid", 0),
    /* 109 */ ("setpgid", 0),
    /* 110 */ ("getppid", 0),
    /* 111 */ ("getpgrp", 0),
    /* 112 */ ("setsid", 0),
    /* 113 */ ("setreuid", 0),
    /* 114 */ ("setregid", 0),
    /* 115 */ ("getgroups", 0),
    /* 116 */ ("setgroups", 0),
    /* 117 */ ("setresuid", 0),
    /* 118 */ ("getresuid", 0),
    /* 119 */ ("setresgid", 0),
    /* 120 */ ("getresgid", 0),
    /* 121 */ ("getpgid", 0),
    /* 122 */ ("setfsuid", 0),
    /* 123 */ ("setfsgid", 0),
    /* 124 */ ("getsid", 0),
    /* 125 */ ("capget", 0),
    /* 126 */ ("capset", 0),
    /* 127 */ ("rt_sigpending", TS),
    /* 128 */ ("rt_sigtimedwait", TS),
    /* 129 */ ("rt_sigqueueinfo", TP|TS),
    /* 130 */ ("rt_sigsuspend", TS),
    /* 131 */ ("sigaltstack", TS),
    /* 132 */ ("utime", TF),
    /* 133 */ ("mknod", TF),
    /* 134 */ ("uselib", TF),
    /* 135 */ ("personality", 0),
    /* 136 */ ("ustat", 0),
    /* 137 */ ("statfs", TF|TSF|TSFA),
    /* 138 */ ("fstatfs", TD|TFSF|TSFA),
    /* 139 */ ("sysfs", 0),
    /* 140 */ ("getpriority", 0),
    /* 141 */ ("setpriority", 0),
    /* 142 */ ("sched_setparam", 0),
    /* 143 */ ("sched_getparam", 0),
    /* 144 */ ("sched_setscheduler", 0),
    /* 145 */ ("sched_getscheduler", 0),
    /* 146 */ ("sched_get_priority_max", 0),
    /* 147 */ ("sched_get_priority_min", 0),
    /* 148 */ ("sched_rr_get_interval", 0),
    /* 149 */ ("mlock", TM),
    /* 150 */ ("munlock", TM),
    /* 151 */ ("mlockall", TM),
    /* 152 */ ("munlockall", TM),
    /* 153 */ ("vhangup", 0),
    /* 154 */ ("modify_ldt", 0),
    /* 155 */ ("pivot_root", TF),
    /* 156 */ ("_sysctl", 0),
    /* 157 */ ("prctl", 0),
    /* 158 */ ("arch_prctl", TP),
    /* 159 */ ("adjtimex", 0),
    /* 160 */ ("setrlimit", 0),
    /* 161 */ ("chroot", TF),
    /* 162 */ ("sync", 0),
    /* 163 */ ("acct", TF),
    /* 164 */ ("settimeofday", 0),
    /* 165 */ ("mount", TF),
    /* 166 */ ("umount2", TF),
    /* 167 */ ("swapon", TF),
    /* 168 */ ("swapoff", TF),
    /* 169 */ ("reboot", 0),
    /* 170 */ ("sethostname", 0),
    /* 171 */ ("setdomainname", 0),
    /* 172 */ ("iopl", 0),
    /* 173 */ ("ioperm", 0),
    /* 174 */ ("create_module", 0),
    /* 175 */ ("init_module", 0),
    /* 176 */ ("delete_module", 0),
    /* 177 */ ("get_kernel_syms", 0),
    /* 178 */ ("query_module", 0),
    /* 179 */ ("quotactl", TF),
    /* 180 */ ("nfsservctl", 0),
    /* 181 */ ("getpmsg", TN),
    /* 182 */ ("putpmsg", TN),
    /* 183 */ ("afs_syscall", 0),
    /* 184 */ ("tuxcall", 0),
    /* 185 */ ("security", 0),
    /* 186 */ ("gettid", 0),
    /* 187 */ ("readahead", TD),
    /* 188 */ ("setxattr", TF),
    /* 189 */ ("lsetxattr", TF),
    /* 190 */ ("fsetxattr", TD),
    /* 191 */ ("getxattr", TF),
    /* 192 */ ("lgetxattr", TF),
    /* 193 */ ("fgetxattr", TD),
    /* 194 */ ("listxattr", TF),
    /* 195 */ ("llistxattr", TF),
    /* 196 */ ("flistxattr", TD),
    /* 197 */ ("removexattr", TF),
    /* 198 */ ("lremovexattr", TF),
    /* 199 */ ("fremovexattr", TD),
    /* 200 */ ("tkill", TP|TS),
    /* 201 */ ("time", 0),
    /* 202 */ ("futex", 0),
    /* 203 */ ("sched_setaffinity", 0),
    /* 204 */ ("sched_getaffinity", 0),
    /* 205 */ ("set_thread_area", 0),
    /* 206 */ ("io_setup", TM),
    /* 207 */ ("io_destroy", TM),
    /* 208 */ ("io_getevents", 0),
    /* 209 */ ("io_submit", 0),
    /* 210 */ ("io_cancel", 0),
    /* 211 */ ("get_thread_area", 0),
    /* 212 */ ("lookup_dcookie", 0),
    /* 213 */ ("epoll_create", TD),
    /* 214 */ ("epoll_ctl_old", 0),
    /* 215 */ ("epoll_wait_old", 0),
    /* 216 */ ("remap_file_pages", TM),
    /* 217 */ ("getdents64", TD),
    /* 218 */ ("set_tid_address", 0),
    /* 219 */ ("restart_syscall", 0),
    /* 220 */ ("semtimedop", TI),
    /* 221 */ ("fadvise64", TD),
    /* 222 */ ("timer_create", 0),
    /* 223 */ ("timer_settime", 0),
    /* 224 */ ("timer_gettime", 0),
    /* 225 */ ("timer_getoverrun", 0),
    /* 226 */ ("timer_delete", 0),
    /* 227 */ ("clock_settime", 0),
    /* 228 */ ("clock_gettime", 0),
    /* 229 */ ("clock_getres", 0),
    /* 230 */ ("clock_nanosleep", 0),
    /* 231 */ ("exit_group", TP),
    /* 232 */ ("epoll_wait", TD),
    /* 233 */ ("epoll_ctl", TD),
    /* 234 */ ("tgkill", TP|TS),
    /* 235 */ ("utimes", TF),
    /* 236 */ ("vserver", 0),
    /* 237 */ ("mbind", TM),
    /* 238 */ ("set_mempolicy", TM),
    /* 239 */ ("get_mempolicy", TM),
    /* 240 */ ("mq_open", TD),
    /* 241 */ ("mq_unlink", 0),
    /* 242 */ ("mq_timedsend", TD),
    /* 243 */ ("mq_timedreceive", TD),
    /* 244 */ ("mq_notify", TD),
    /* 245 */ ("mq_getsetattr", TD),
    /* 246 */ ("kexec_load", 0),
    /* 247 */ ("waitid", TP),
    /* 248 */ ("add_key", 0),
    /* 249 */ ("request_key", 0),
    /* 250 */ ("keyctl", 0),
    /* 251 */ ("ioprio_set", 0),
    /* 252 */ ("ioprio_get", 0),
    /* 253 */ ("inotify_init", TD),
    /* 254 */ ("inotify_add_watch", TD|TF),
    /* 255 */ ("inotify_rm_watch", TD),
    /* 256 */ ("migrate_pages", TM),
    /* 257 */ ("openat", TD|TF),
    /* 258 */ ("mkdirat", TD|TF),
    /* 259 */ ("mknodat", TD|TF),
    /* 260 */ ("fchownat", TD|TF),
    /* 261 */ ("futimesat", TD|TF),
    /* 262 */ ("newfstatat", TD|TF|TFST|TSTA),
    /* 263 */ ("unlinkat", TD|TF),
    /* 264 */ ("renameat", TD|TF),
    /* 265 */ ("linkat", TD|TF),
    /* 266 */ ("symlinkat", TD|TF),
    /* 267 */ ("readlinkat", TD|TF),
    /* 268 */ ("fchmodat", TD|TF),
    /* 269 */ ("faccessat", TD|TF),
    /* 270 */ ("pselect6", TD),
    /* 271 */ ("ppoll", TD),
    /* 272 */ ("unshare", TP),
    /* 273 */ ("set_robust_list", 0),
    /* 274 */ ("get_robust_list", 0),
    /* 275 */ ("splice", TD),
    /* 276 */ ("tee", TD),
    /* 277 */ ("sync_file_range", TD),
    /* 278 */ ("vmsplice", TD),
    /* 279 */ ("move_pages", TM),
    /* 280 */ ("utimensat", TD|TF),
    /* 281 */ ("epoll_pwait", TD),
    /* 282 */ ("signalfd", TD|TS),
    /* 283 */ ("timerfd_create", TD),
    /* 284 */ ("eventfd", TD),
    /* 285 */ ("fallocate", TD),
    /* 286 */ ("timerfd_settime", TD),
    /* 287 */ ("timerfd_gettime", TD),
    /* 288 */ ("accept4", TN),
    /* 289 */ ("signalfd4", TD|TS),
    /* 290 */ ("eventfd2", TD),
    /* 291 */ ("epoll_create1", TD),
    /* 292 */ ("dup3", TD),
    /* 293 */ ("pipe2", TD),
    /* 294 */ ("inotify_init1", TD),
    /* 295 */ ("preadv", TD),
    /* 296 */ ("pwritev", TD),
    /* 297 */ ("rt_tgsigqueueinfo", TP|TS),
    /* 298 */ ("perf_event_open", TD),
    /* 299 */ ("recvmmsg", TN),
    /* 300 */ ("fanotify_init", TD),
    /* 301 */ ("fanotify_mark", TD|TF),
    /* 302 */ ("prlimit64", 0),
    /* 303 */ ("name_to_handle_at", TD|TF),
    /* 304 */ ("open_by_handle_at", TD),
    /* 305 */ ("clock_adjtime", 0),
    /* 306 */ ("syncfs", TD),
    /* 307 */ ("sendmmsg", TN),
    /* 308 */ ("setns", TD),
    /* 309 */ ("getcpu", 0),
    /* 310 */ ("process_vm_readv", 0),
    /* 311 */ ("process_vm_writev", 0),
    /* 312 */ ("kcmp", 0),
    /* 313 */ ("finit_module", TD),
    /* 314 */ ("sched_setattr", 0),
    /* 315 */ ("sched_getattr", 0),
    /* 316 */ ("renameat2", TD|TF),
    /* 317 */ ("seccomp", 0),
    /* 318 */ ("getrandom", 0),
    /* 319 */ ("memfd_create", TD),
    /* 320 */ ("kexec_file_load", TD),
    /* 321 */ ("bpf", TD),
    /* 322 */ ("execveat", TD|TF|TP),
    /* 323 */ ("userfaultfd", TD),
    /* 324 */ ("membarrier", 0),
    /* 325 */ ("mlock2", TM),
    /* 326 */ ("copy_file_range", TD),
    /* 327 */ ("preadv2", TD),
    /* 328 */ ("pwritev2", TD),
    /* 329 */ ("pkey_mprotect", TM),
    /* 330 */ ("pkey_alloc", 0),
    /* 331 */ ("pkey_free", 0),
    /* 332 */ ("statx", TD|TF|TFST|TSTA),
    /* 333 */ ("io_pgetevents", 0),
    /* 334 */ ("rseq", 0),
];

/// The x86_64 personality table
pub fn x86_64() -> SyscallTable {
    SyscallTable::new(
        "x86_64",
        X86_64
            .iter()
            .map(|&(name, flags)| SyscallEntry::new(name, SyscallClass::from_bits_truncate(flags)))
            .collect(),
    )
}
