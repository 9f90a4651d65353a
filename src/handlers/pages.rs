use crate::schema::SCHEMA_SQL;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde_json::json;

// Health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "demo_mode": state.config.demo_mode(),
        "assistant": state.assistant.enabled(),
    }))
}

pub async fn schema_sql() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain; charset=utf-8").body(SCHEMA_SQL)
}

// Homepage endpoint
pub async fn serve_homepage() -> HttpResponse {
    let html_content = r#"
    <!DOCTYPE html>
    <html>
    <head>
        <title>JEE Prep Tracker</title>
        <style>
            body { font-family: Arial, sans-serif; max-width: 900px; margin: 40px auto; padding: 20px; }
            .container { background: #f5f5f5; padding: 25px; border-radius: 10px; }
            .form-group { margin: 12px 0; }
            label { display: block; margin-bottom: 5px; font-weight: bold; }
            input, select { width: 100%; padding: 10px; border: 1px solid #ddd; border-radius: 4px; }
            button { background: #ff6b35; color: white; padding: 12px 24px; border: none; border-radius: 4px; cursor: pointer; margin: 5px; }
            button:hover { background: #e55a2b; }
            .panel { margin-top: 20px; padding: 20px; border-radius: 5px; background: #fff; display: none; }
            .bar { background: #eee; border-radius: 4px; height: 14px; margin: 4px 0 10px; }
            .bar span { display: block; height: 100%; border-radius: 4px; background: #28a745; }
            table { width: 100%; border-collapse: collapse; margin: 10px 0; }
            th, td { padding: 8px; text-align: left; border-bottom: 1px solid #ddd; }
            th { background: #f8f9fa; }
            .error { color: #721c24; }
        </style>
    </head>
    <body>
        <div class="container">
            <h1>JEE Prep Tracker</h1>
            <p>Sign in with a demo account (password <code>demo123</code>):
               student@jeeprep.dev, parent@jeeprep.dev or admin@jeeprep.dev.</p>

            <div class="form-group">
                <label for="email">Email</label>
                <input type="email" id="email" value="student@jeeprep.dev">
            </div>
            <div class="form-group">
                <label for="password">Password</label>
                <input type="password" id="password" value="demo123">
            </div>
            <div class="form-group">
                <label for="role">Role</label>
                <select id="role">
                    <option value="student">Student</option>
                    <option value="parent">Parent</option>
                    <option value="admin">Admin</option>
                </select>
            </div>
            <button onclick="login()">Sign in</button>
            <div id="message"></div>

            <div id="student" class="panel">
                <h3>Syllabus progress</h3>
                <div id="progress"></div>
                <h3>Recent tests</h3>
                <div id="attempts"></div>
                <button onclick="motivate()">Motivate me</button>
                <p id="motivation"></p>
            </div>

            <div id="parent" class="panel">
                <h3>Your child's progress</h3>
                <div id="parent-content"></div>
            </div>

            <div id="admin" class="panel">
                <h3>Platform overview</h3>
                <div id="admin-content"></div>
            </div>
        </div>

        <script>
            let currentUser = null;

            async function login() {
                const body = {
                    email: document.getElementById('email').value,
                    password: document.getElementById('password').value,
                    role: document.getElementById('role').value,
                };
                const response = await fetch('/auth/login', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify(body),
                });
                const result = await response.json();
                const message = document.getElementById('message');
                if (!result.success) {
                    message.innerHTML = '<p class="error">' + result.message + '</p>';
                    return;
                }
                currentUser = result.user;
                message.innerHTML = '<p>Welcome, ' + currentUser.name + '</p>';
                document.querySelectorAll('.panel').forEach(p => p.style.display = 'none');
                if (currentUser.role === 'student') await showStudent(currentUser.id);
                if (currentUser.role === 'parent') await showParent(currentUser.id);
                if (currentUser.role === 'admin') await showAdmin();
            }

            function bars(subjects) {
                return subjects.map(s =>
                    '<div>' + s.subject + ': ' + s.percent + '%</div>' +
                    '<div class="bar"><span style="width:' + s.percent + '%"></span></div>'
                ).join('');
            }

            function attemptTable(attempts) {
                if (attempts.length === 0) return '<p>No attempts yet.</p>';
                let html = '<table><tr><th>Test</th><th>Score</th><th>Accuracy</th></tr>';
                attempts.forEach(a => {
                    html += '<tr><td>' + a.test_name + '</td><td>' + a.score + '/' + a.max_score +
                        '</td><td>' + a.accuracy + '%</td></tr>';
                });
                return html + '</table>';
            }

            async function showStudent(id) {
                const progress = await (await fetch('/students/' + id + '/progress')).json();
                const attempts = await (await fetch('/students/' + id + '/attempts')).json();
                document.getElementById('progress').innerHTML =
                    '<p>Overall: ' + progress.overall_percent + '%</p>' + bars(progress.subjects);
                document.getElementById('attempts').innerHTML = attemptTable(attempts);
                document.getElementById('student').style.display = 'block';
            }

            async function showParent(id) {
                const response = await fetch('/parents/' + id + '/dashboard');
                const data = await response.json();
                const target = document.getElementById('parent-content');
                if (!response.ok) {
                    target.innerHTML = '<p class="error">' + data.error + '</p>';
                } else {
                    target.innerHTML = '<h4>' + data.student.name + '</h4>' +
                        bars(data.progress.subjects) + attemptTable(data.recent_attempts);
                }
                document.getElementById('parent').style.display = 'block';
            }

            async function showAdmin() {
                const data = await (await fetch('/admin/overview')).json();
                let html = '<table>';
                Object.entries(data.users_by_role).forEach(([role, count]) => {
                    html += '<tr><td>' + role + 's</td><td>' + count + '</td></tr>';
                });
                html += '<tr><td>Tests</td><td>' + data.total_tests + '</td></tr>';
                html += '<tr><td>Questions</td><td>' + data.total_questions + '</td></tr>';
                html += '<tr><td>Attempts</td><td>' + data.total_attempts + '</td></tr>';
                html += '<tr><td>Average score</td><td>' + data.average_score_percent + '%</td></tr>';
                document.getElementById('admin-content').innerHTML = html + '</table>';
                document.getElementById('admin').style.display = 'block';
            }

            async function motivate() {
                const response = await fetch('/assistant/motivation', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({ name: currentUser.name }),
                });
                const reply = await response.json();
                document.getElementById('motivation').textContent = reply.text;
            }
        </script>
    </body>
    </html>
    "#;

    HttpResponse::Ok().content_type("text/html").body(html_content)
}
